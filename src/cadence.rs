//! # Cadence-aware window sizing
//!
//! The fitting procedure slides a fixed-size observation window over the
//! time series. A window sized for one satellite spans half the real-world
//! time once a second satellite contributes acquisitions, which would make
//! detection sensitivity depend on sensor availability. [`adjust_window`]
//! rescales the default window so that it covers a constant time span
//! whatever the observation density.

use itertools::Itertools;

use crate::constants::{OrdinalDay, SINGLE_SENSOR_REVISIT};

/// Most frequent consecutive gap, ties resolved toward the smaller gap.
fn modal_gap(dates: &[OrdinalDay]) -> OrdinalDay {
    dates
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .counts()
        .into_iter()
        .max_by(|(gap_a, count_a), (gap_b, count_b)| {
            count_a.cmp(count_b).then(gap_b.cmp(gap_a))
        })
        .map(|(gap, _)| gap)
        .unwrap_or(SINGLE_SENSOR_REVISIT)
}

/// Rescale a fitting-window size to the observation cadence.
///
/// The dominant gap between consecutive acquisitions estimates how many
/// sensors contribute to the record: a 16-day gap is a single satellite and
/// leaves the window unchanged, an 8-day gap means two satellites and
/// doubles it, and intermediate cadences interpolate proportionally. Denser
/// data never yields a smaller window than sparser data, and a window is
/// never shrunk below the default.
///
/// Arguments
/// ---------
/// * `dates`: full ordinal-date sequence of the pixel
/// * `default_window`: default window size, in observations
///
/// Return
/// ------
/// * The adjusted window size. Fewer than two dates leave the default
///   unchanged (not enough evidence to adjust); near-duplicate dates with a
///   modal gap of one day scale it all the way to `16 * default`.
pub fn adjust_window(dates: &[OrdinalDay], default_window: usize) -> usize {
    if dates.len() < 2 {
        return default_window;
    }

    let gap = modal_gap(dates).max(1);
    if gap >= SINGLE_SENSOR_REVISIT {
        return default_window;
    }

    let scale = SINGLE_SENSOR_REVISIT as f64 / gap as f64;
    (default_window as f64 * scale).round() as usize
}
