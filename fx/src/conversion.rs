//! Conversion outcomes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Why an amount was passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoConversionReason {
    /// Target is the base currency.
    SameCurrency,
    /// No usable rate table yet, or a refresh is in flight.
    RatesUnavailable,
    /// Target code is absent from the rate table.
    UnknownCurrency,
    /// Converted amount exceeds the decimal range.
    Overflow,
}

/// Result of converting an amount into a display currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conversion {
    /// Amount was multiplied by `rate`.
    Converted { amount: Decimal, rate: Decimal },
    /// Amount is the caller's input, unchanged.
    NoConversionApplied {
        amount: Decimal,
        reason: NoConversionReason,
    },
}

impl Conversion {
    /// Amount to display, converted or not.
    pub fn amount(&self) -> Decimal {
        match self {
            Conversion::Converted { amount, .. } => *amount,
            Conversion::NoConversionApplied { amount, .. } => *amount,
        }
    }

    /// Check whether a rate was applied.
    pub fn is_converted(&self) -> bool {
        matches!(self, Conversion::Converted { .. })
    }
}
