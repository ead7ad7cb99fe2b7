//! # Observation quality classification and masking
//!
//! This module decides which observations of a pixel time series are
//! trustworthy input for curve fitting. It covers:
//!
//! * Resolution of bit-packed quality codes into a single [`QaLabel`] under
//!   the fixed priority hierarchy fill > cloud > shadow > snow > water > clear.
//! * Vectorized boolean masks over the classified sequence (snow, clear,
//!   water, fill, duplicate acquisition dates).
//! * Counting and ratio helpers used to gate the choice of filtering
//!   procedure.
//! * The saturation, thermal-range and median-green spectral filters.
//! * The three composite filtering procedures, [`standard_filter`],
//!   [`snow_filter`] and [`insufficient_clear_filter`], which are mutually
//!   exclusive alternatives selected through [`select_procedure`].
//!
//! All masks are the same length as their source sequence; `true` marks an
//! observation selected for use.

use ahash::AHashSet;
use itertools::izip;
use nalgebra::DMatrix;

use crate::ccdc_errors::CcdcError;
use crate::constants::{OrdinalDay, QualityCode};
use crate::params::Params;
use crate::statistics::median;

/// Categorical quality of one observation, resolved from its bit-packed
/// quality code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QaLabel {
    Fill,
    Cloud,
    Shadow,
    Snow,
    Water,
    Clear,
}

/// The three mutually exclusive filtering procedures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    /// Enough clear observations: clear/water, thermal and saturation tests
    Standard,
    /// Mostly snow: standard tests relaxed to also admit snow observations
    Snow,
    /// Too few clear observations: standard tests plus the median-green
    /// exclusion
    InsufficientClear,
}

/// Check for a bit flag in a packed quality code.
pub fn check_bit(code: QualityCode, offset: u8) -> bool {
    code & (1 << offset) != 0
}

/// Resolve a bit-packed quality code to a single label.
///
/// Several quality bits may be set at once; the hierarchy
/// fill > cloud > shadow > snow > water > clear decides which one wins.
///
/// Arguments
/// ---------
/// * `code`: bit-packed quality value
/// * `params`: configuration holding the bit offset of each label
///
/// Return
/// ------
/// * The highest-priority [`QaLabel`] whose bit is set, or
///   [`CcdcError::UnsupportedQualityValue`] if none of the six configured
///   bits is set. A code with no recognized bit signals corrupted input
///   metadata and must not be guessed around.
pub fn classify(code: QualityCode, params: &Params) -> Result<QaLabel, CcdcError> {
    if check_bit(code, params.qa_fill) {
        Ok(QaLabel::Fill)
    } else if check_bit(code, params.qa_cloud) {
        Ok(QaLabel::Cloud)
    } else if check_bit(code, params.qa_shadow) {
        Ok(QaLabel::Shadow)
    } else if check_bit(code, params.qa_snow) {
        Ok(QaLabel::Snow)
    } else if check_bit(code, params.qa_water) {
        Ok(QaLabel::Water)
    } else if check_bit(code, params.qa_clear) {
        Ok(QaLabel::Clear)
    } else {
        Err(CcdcError::UnsupportedQualityValue(code))
    }
}

/// Resolve a whole quality-code sequence element-wise.
///
/// Same failure semantics as [`classify`]: the first unrecognized code
/// aborts the batch.
pub fn classify_all(codes: &[QualityCode], params: &Params) -> Result<Vec<QaLabel>, CcdcError> {
    codes.iter().map(|&code| classify(code, params)).collect()
}

/// Mask of snow-labeled observations.
pub fn mask_snow(labels: &[QaLabel]) -> Vec<bool> {
    labels.iter().map(|&l| l == QaLabel::Snow).collect()
}

/// Mask of clear-labeled observations.
pub fn mask_clear(labels: &[QaLabel]) -> Vec<bool> {
    labels.iter().map(|&l| l == QaLabel::Clear).collect()
}

/// Mask of water-labeled observations.
pub fn mask_water(labels: &[QaLabel]) -> Vec<bool> {
    labels.iter().map(|&l| l == QaLabel::Water).collect()
}

/// Mask of fill-labeled observations.
pub fn mask_fill(labels: &[QaLabel]) -> Vec<bool> {
    labels.iter().map(|&l| l == QaLabel::Fill).collect()
}

/// Mask of observations labeled either clear or water.
pub fn mask_clear_or_water(labels: &[QaLabel]) -> Vec<bool> {
    labels
        .iter()
        .map(|&l| l == QaLabel::Clear || l == QaLabel::Water)
        .collect()
}

/// Mask keeping only the first occurrence of each distinct date.
///
/// Duplicate acquisition dates happen when two scenes overlap a pixel; only
/// one of them should feed the fitting procedure. This mask is meant to be
/// applied *within an already-filtered subset*, so the retained occurrence
/// is the first among valid candidates rather than the first globally.
///
/// Arguments
/// ---------
/// * `dates`: ordinal date values, one per candidate observation
///
/// Return
/// ------
/// * A same-length boolean mask, `true` on first occurrences
pub fn mask_duplicate_dates(dates: &[OrdinalDay]) -> Vec<bool> {
    let mut seen = AHashSet::with_capacity(dates.len());
    dates.iter().map(|&d| seen.insert(d)).collect()
}

/// Number of clear or water observations.
pub fn count_clear_or_water(labels: &[QaLabel]) -> usize {
    labels
        .iter()
        .filter(|&&l| l == QaLabel::Clear || l == QaLabel::Water)
        .count()
}

/// Number of fill observations.
pub fn count_fill(labels: &[QaLabel]) -> usize {
    labels.iter().filter(|&&l| l == QaLabel::Fill).count()
}

/// Number of snow observations.
pub fn count_snow(labels: &[QaLabel]) -> usize {
    labels.iter().filter(|&&l| l == QaLabel::Snow).count()
}

/// Number of non-fill observations.
pub fn count_total(labels: &[QaLabel]) -> usize {
    labels.len() - count_fill(labels)
}

/// Ratio of clear/water observations to non-fill observations.
///
/// The denominator is deliberately unguarded: a sequence that is entirely
/// fill divides zero by zero and yields NaN, which propagates to the caller
/// instead of being swallowed into an arbitrary default. [`enough_clear`]
/// evaluates `NaN >= threshold` as false, so an all-fill pixel never takes
/// the standard procedure.
pub fn ratio_clear(labels: &[QaLabel]) -> f64 {
    count_clear_or_water(labels) as f64 / count_total(labels) as f64
}

/// Ratio of snow observations to snow plus clear/water observations.
///
/// The `+ 0.01` smoothing term keeps the ratio finite even when both counts
/// are zero, at the cost of a small bias toward zero. The result is always
/// in `[0, 1)`.
pub fn ratio_snow(labels: &[QaLabel]) -> f64 {
    let snow = count_snow(labels) as f64;
    let clear = count_clear_or_water(labels) as f64;
    snow / (clear + snow + 0.01)
}

/// True when the clear/water ratio reaches the configured threshold.
pub fn enough_clear(labels: &[QaLabel], params: &Params) -> bool {
    ratio_clear(labels) >= params.clear_pct_threshold
}

/// True when the snow ratio reaches the configured threshold.
pub fn enough_snow(labels: &[QaLabel], params: &Params) -> bool {
    ratio_snow(labels) >= params.snow_pct_threshold
}

/// Pick the filtering procedure for a pixel from its quality labels.
///
/// Enough clear observations select the standard procedure; otherwise a
/// predominantly snow-covered pixel takes the snow procedure, and anything
/// else falls back to the insufficient-clear procedure.
pub fn select_procedure(labels: &[QaLabel], params: &Params) -> Procedure {
    if enough_clear(labels, params) {
        Procedure::Standard
    } else if enough_snow(labels, params) {
        Procedure::Snow
    } else {
        Procedure::InsufficientClear
    }
}

/// Mask of unsaturated observations.
///
/// An observation is accepted only when every non-thermal band lies strictly
/// within `(0, 10000)` scaled reflectance units; a single band outside the
/// range excludes the whole observation.
///
/// Arguments
/// ---------
/// * `observations`: band-major spectral matrix (bands x acquisitions)
/// * `params`: configuration giving the thermal row to exempt
pub fn filter_saturated(observations: &DMatrix<f64>, params: &Params) -> Vec<bool> {
    (0..observations.ncols())
        .map(|col| {
            (0..observations.nrows())
                .filter(|&row| row != params.thermal_idx)
                .all(|row| {
                    let value = observations[(row, col)];
                    value > 0.0 && value < 10000.0
                })
        })
        .collect()
}

/// Mask of observations with a plausible brightness temperature.
///
/// The thermal band is scaled degrees celsius; the default bounds
/// `(-9320, 7070)` correspond to (-93.2C, 70.7C) unscaled. Both bounds are
/// exclusive.
pub fn filter_thermal(observations: &DMatrix<f64>, params: &Params) -> Vec<bool> {
    observations
        .row(params.thermal_idx)
        .iter()
        .map(|&t| t > params.thermal_min_celsius && t < params.thermal_max_celsius)
        .collect()
}

/// Mask of observations whose green value stays below the candidate median
/// plus a fixed offset.
///
/// The median is computed only over the candidate values this filter is
/// applied to, so callers must slice their data down to the candidate set
/// first.
pub fn filter_median_green(green: &[f64], filter_range: f64) -> Vec<bool> {
    let cutoff = median(green) + filter_range;
    green.iter().map(|&g| g < cutoff).collect()
}

/// Write a submask back into the `true` positions of `mask`.
///
/// `sub` must have exactly one entry per currently-true position.
fn scatter_submask(mask: &mut [bool], sub: &[bool]) {
    debug_assert_eq!(mask.iter().filter(|&&m| m).count(), sub.len());
    let mut next = 0;
    for slot in mask.iter_mut() {
        if *slot {
            *slot = sub[next];
            next += 1;
        }
    }
}

/// Intersect `mask` with the duplicate-date mask computed over the dates
/// surviving `mask`, so the first-occurrence choice is made among valid
/// candidates only.
fn restrict_to_first_dates(mask: &mut [bool], dates: &[OrdinalDay]) {
    let surviving: Vec<OrdinalDay> = dates
        .iter()
        .zip(mask.iter())
        .filter(|(_, &m)| m)
        .map(|(&d, _)| d)
        .collect();
    let keep = mask_duplicate_dates(&surviving);
    scatter_submask(mask, &keep);
}

/// Filter for the initial stages of the standard procedure.
///
/// Clear or water, thermal in range and unsaturated, then duplicate dates
/// removed within the surviving subset.
///
/// Arguments
/// ---------
/// * `observations`: band-major spectral matrix (bands x acquisitions)
/// * `labels`: classified quality labels, one per acquisition
/// * `dates`: ordinal acquisition dates
/// * `params`: pipeline configuration
///
/// Return
/// ------
/// * A boolean mask over the full input length
pub fn standard_filter(
    observations: &DMatrix<f64>,
    labels: &[QaLabel],
    dates: &[OrdinalDay],
    params: &Params,
) -> Vec<bool> {
    let clear_or_water = mask_clear_or_water(labels);
    let thermal = filter_thermal(observations, params);
    let unsaturated = filter_saturated(observations, params);

    let mut mask: Vec<bool> = izip!(&clear_or_water, &thermal, &unsaturated)
        .map(|(&cw, &t, &u)| cw && t && u)
        .collect();

    restrict_to_first_dates(&mut mask, dates);
    mask
}

/// Filter for the initial stages of the snow procedure.
///
/// An observation qualifies when it passes the standard base tests *or* is
/// snow-labeled; duplicates are then removed within that unioned subset.
pub fn snow_filter(
    observations: &DMatrix<f64>,
    labels: &[QaLabel],
    dates: &[OrdinalDay],
    params: &Params,
) -> Vec<bool> {
    let clear_or_water = mask_clear_or_water(labels);
    let thermal = filter_thermal(observations, params);
    let unsaturated = filter_saturated(observations, params);
    let snow = mask_snow(labels);

    let mut mask: Vec<bool> = izip!(&clear_or_water, &thermal, &unsaturated, &snow)
        .map(|(&cw, &t, &u, &s)| (cw && t && u) || s)
        .collect();

    restrict_to_first_dates(&mut mask, dates);
    mask
}

/// Filter for the initial stages of the insufficient-clear procedure.
///
/// Starts from the standard mask, then additionally excludes observations
/// whose green value exceeds the median green of the standard-masked subset
/// plus the configured offset, then removes duplicate dates within the
/// doubly-restricted subset.
pub fn insufficient_clear_filter(
    observations: &DMatrix<f64>,
    labels: &[QaLabel],
    dates: &[OrdinalDay],
    params: &Params,
) -> Vec<bool> {
    let mut mask = standard_filter(observations, labels, dates, params);

    let green_row = observations.row(params.green_idx);
    let surviving_green: Vec<f64> = green_row
        .iter()
        .zip(mask.iter())
        .filter(|(_, &m)| m)
        .map(|(&g, _)| g)
        .collect();

    let keep = filter_median_green(&surviving_green, params.median_green_filter);
    scatter_submask(&mut mask, &keep);

    restrict_to_first_dates(&mut mask, dates);
    mask
}
