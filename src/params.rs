//! # Processing parameters
//!
//! One immutable configuration structure gathers every tunable of the
//! qualification pipeline: quality-band bit offsets, the clear/snow ratio
//! thresholds that select the filtering procedure, the spectral filter
//! bounds, the band row assignments of the input matrix and the default
//! fitting-window size.
//!
//! Every operation that needs configuration takes a `&Params`, so a whole
//! per-pixel run is auditable from a single value and can be overridden per
//! invocation without touching global state.

use crate::constants::Band;

/// Configuration for the observation-qualification pipeline.
///
/// The defaults correspond to Landsat collection products: the pixel QA
/// band flags fill/clear/water/shadow/snow/cloud on bits 0 through 5, the
/// spectral bands are scaled reflectance in `[0, 10000]` and the thermal
/// band is scaled degrees celsius (factor 100).
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    /// Bit offset flagging fill in the packed quality code
    pub qa_fill: u8,
    /// Bit offset flagging clear
    pub qa_clear: u8,
    /// Bit offset flagging water
    pub qa_water: u8,
    /// Bit offset flagging cloud shadow
    pub qa_shadow: u8,
    /// Bit offset flagging snow
    pub qa_snow: u8,
    /// Bit offset flagging cloud
    pub qa_cloud: u8,
    /// Minimum ratio of clear/water observations for the standard procedure
    pub clear_pct_threshold: f64,
    /// Minimum ratio of snow observations for the snow procedure
    pub snow_pct_threshold: f64,
    /// Offset added to the median green value by the median-green filter,
    /// in scaled reflectance units
    pub median_green_filter: f64,
    /// Lower thermal bound in scaled degrees celsius (-93.2C unscaled)
    pub thermal_min_celsius: f64,
    /// Upper thermal bound in scaled degrees celsius (70.7C unscaled)
    pub thermal_max_celsius: f64,
    /// Row of the green band in the band-major spectral matrix
    pub green_idx: usize,
    /// Row of the thermal band in the band-major spectral matrix
    pub thermal_idx: usize,
    /// Default fitting-window size, in observations, before cadence
    /// adjustment
    pub default_window: usize,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            qa_fill: 0,
            qa_clear: 1,
            qa_water: 2,
            qa_shadow: 3,
            qa_snow: 4,
            qa_cloud: 5,
            clear_pct_threshold: 0.25,
            snow_pct_threshold: 0.75,
            median_green_filter: 400.0,
            thermal_min_celsius: -9320.0,
            thermal_max_celsius: 7070.0,
            green_idx: Band::Green.index(),
            thermal_idx: Band::Thermal.index(),
            default_window: 6,
        }
    }
}
