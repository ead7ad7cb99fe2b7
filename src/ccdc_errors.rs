use thiserror::Error;

use crate::constants::QualityCode;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CcdcError {
    #[error("Unsupported bit-packed QA value: {0}")]
    UnsupportedQualityValue(QualityCode),

    #[error("Expected {expected} band models, got {actual}")]
    MissingBandModels { expected: usize, actual: usize },

    #[error("Expected {expected} band magnitudes, got {actual}")]
    MissingMagnitudes { expected: usize, actual: usize },
}
