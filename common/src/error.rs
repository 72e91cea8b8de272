//! Error types shared across emicalc crates.

use thiserror::Error;

/// Errors raised while interpreting currency codes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    /// Code is not three ASCII letters.
    #[error("Invalid currency code: {0:?}")]
    InvalidCode(String),
}

/// Result type alias for currency operations.
pub type Result<T> = std::result::Result<T, CurrencyError>;
