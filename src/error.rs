// =============================================================================
// Scanner Errors
// =============================================================================
//
// Typed failures of the indicator / scoring pipeline.  Numeric edge cases
// (zero dispersion, zero average loss, empty universe) are NOT errors: they
// resolve to defined sentinel values inside the calculators.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    /// Fewer candles / values than the longest window of the calculation.
    #[error("insufficient data for {indicator}: need {required}, have {available}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        available: usize,
    },

    /// A computed field came out NaN or infinite (e.g. non-positive prices
    /// feeding a log return).
    #[error("non-finite value computed for {field}")]
    NonFinite { field: &'static str },

    /// Configuration failed validation (weights not summing to 1, etc.).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ScanError {
    pub fn insufficient(indicator: &'static str, required: usize, available: usize) -> Self {
        Self::InsufficientData {
            indicator,
            required,
            available,
        }
    }

    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}
