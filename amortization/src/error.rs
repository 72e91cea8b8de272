//! Loan input error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by the strict loan entry points.
///
/// The fail-soft entry points never return these; they yield a zero payment
/// and an empty schedule instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoanError {
    /// Principal must be positive.
    #[error("Invalid loan input: principal {0} must be positive")]
    NonPositivePrincipal(Decimal),

    /// Annual rate must not be negative.
    #[error("Invalid loan input: annual rate {0}% must not be negative")]
    NegativeRate(Decimal),

    /// Term must be between one year and the supported maximum.
    #[error("Invalid loan input: term of {term_years} years outside 1..={max_years}")]
    TermOutOfRange { term_years: u32, max_years: u32 },

    /// Compound factor exceeded the decimal range.
    #[error("Invalid loan input: rate {rate}% over {periods} periods overflows")]
    Overflow { rate: Decimal, periods: u32 },
}

/// Result type for strict loan operations.
pub type LoanResult<T> = Result<T, LoanError>;
