//! Error type shared by every operation in the crate

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    /// Malformed or out-of-range input: empty signal, bad sample rate,
    /// cutoff at or above Nyquist, inverted band, oversized window...
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A statistic whose denominator is exactly zero
    #[error("Division by zero while computing {feature}")]
    DivisionByZero { feature: String },
}

impl SignalError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SignalError::InvalidInput(msg.into())
    }

    pub(crate) fn division_by_zero(feature: impl Into<String>) -> Self {
        SignalError::DivisionByZero {
            feature: feature.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SignalError>;
