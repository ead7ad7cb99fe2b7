//! # Constants and type definitions for ccdc
//!
//! This module centralizes the **cadence constants** and **common type
//! definitions** used throughout the `ccdc` library, together with the fixed
//! spectral band enumeration.
//!
//! ## Overview
//!
//! - Sensor revisit cadence and temporal-correlation constants
//! - Core type aliases used across the crate
//! - The canonical seven-band ordering of Landsat-style observations
//!
//! These definitions are used by all main modules, including the quality
//! masking pipeline, the noise statistics and the result consolidation.

// -------------------------------------------------------------------------------------------------
// Cadence constants
// -------------------------------------------------------------------------------------------------

/// Revisit interval of a single satellite, in days
pub const SINGLE_SENSOR_REVISIT: i64 = 16;

/// Minimum temporal distance between two observations, in days, for their
/// spectral difference to be considered free of short-term autocorrelation
pub const TEMPORAL_CORRELATION_SPAN: i64 = 30;

/// Number of spectral bands carried by every observation and every segment
pub const NUM_BANDS: usize = 7;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Acquisition date as an integer day count on a fixed calendar epoch
pub type OrdinalDay = i64;

/// Bit-packed observation quality code
pub type QualityCode = u32;

// -------------------------------------------------------------------------------------------------
// Spectral bands
// -------------------------------------------------------------------------------------------------

/// The seven spectral bands of an observation, in canonical order.
///
/// Every observation matrix and every change-model segment carries exactly
/// these bands, in exactly this order. Using a named enumeration instead of
/// positional indices keeps band lookups explicit and prevents silent
/// off-by-one errors when slicing the spectral matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Blue,
    Green,
    Red,
    Nir,
    Swir1,
    Swir2,
    Thermal,
}

impl Band {
    /// All seven bands in canonical order
    pub const ALL: [Band; NUM_BANDS] = [
        Band::Blue,
        Band::Green,
        Band::Red,
        Band::Nir,
        Band::Swir1,
        Band::Swir2,
        Band::Thermal,
    ];

    /// Row index of this band in a band-major spectral matrix
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Band::Blue => "blue",
            Band::Green => "green",
            Band::Red => "red",
            Band::Nir => "nir",
            Band::Swir1 => "swir1",
            Band::Swir2 => "swir2",
            Band::Thermal => "thermal",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod test_constants {
    use super::*;

    #[test]
    fn test_band_order() {
        assert_eq!(Band::ALL.len(), NUM_BANDS);
        assert_eq!(Band::Blue.index(), 0);
        assert_eq!(Band::Green.index(), 1);
        assert_eq!(Band::Thermal.index(), 6);
        assert_eq!(Band::Swir2.to_string(), "swir2");
    }
}
