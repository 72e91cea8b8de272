//! FX service error types.

use std::time::Duration;

use emicalc_common::{Currency, CurrencyError};
use thiserror::Error;

/// Errors that can occur while fetching rate tables.
///
/// These never reach `convert` callers; the service records them in its
/// state as the human-readable `last_error`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FxError {
    /// Base currency code is not usable in a request.
    #[error("Invalid currency: {0}")]
    InvalidCurrency(#[from] CurrencyError),

    /// Transport-level failure talking to the provider.
    #[error("Network error: {0}")]
    Network(String),

    /// Provider answered but reported a failure.
    #[error("Rate provider error: {0}")]
    ProviderError(String),

    /// Provider answered with a body we could not interpret.
    #[error("Malformed rate payload: {0}")]
    MalformedPayload(String),

    /// Provider has no table for the requested base currency.
    #[error("Rates not available for {0}")]
    RateNotAvailable(Currency),

    /// Fetch did not settle within the configured bound.
    #[error("Rate fetch timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Provider could not be built from configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl FxError {
    /// Check if retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FxError::Network(_) | FxError::Timeout(_))
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_readable() {
        assert_eq!(
            FxError::Timeout(Duration::from_millis(1500)).to_string(),
            "Rate fetch timed out after 1500ms"
        );
        assert_eq!(
            FxError::ProviderError("invalid-key".into()).to_string(),
            "Rate provider error: invalid-key"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(FxError::Network("connection reset".into()).is_retryable());
        assert!(FxError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(!FxError::ProviderError("quota-reached".into()).is_retryable());
        assert!(!FxError::MalformedPayload("eof".into()).is_retryable());
    }
}
