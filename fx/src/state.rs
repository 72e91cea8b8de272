//! Conversion state definitions.

use std::fmt;
use std::sync::Arc;

use emicalc_common::Currency;
use rust_decimal::Decimal;

use crate::conversion::{Conversion, NoConversionReason};
use crate::table::RateTable;

/// Lifecycle of the current base currency's rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionStatus {
    /// No base currency has been requested yet.
    Idle,
    /// A fetch for the current base currency is in flight.
    Loading,
    /// The table for the current base currency is loaded.
    Ready,
    /// The last fetch failed; any earlier table is kept.
    Failed,
}

impl ConversionStatus {
    /// Check if conversions may use the rate table.
    pub fn allows_conversion(&self) -> bool {
        matches!(self, ConversionStatus::Ready | ConversionStatus::Failed)
    }
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConversionStatus::Idle => "idle",
            ConversionStatus::Loading => "loading",
            ConversionStatus::Ready => "ready",
            ConversionStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Snapshot of the conversion service.
#[derive(Debug, Clone)]
pub struct ConversionState {
    /// Most recently requested base currency.
    pub base_currency: Currency,
    /// Last successfully fetched table, if any.
    pub rates: Option<Arc<RateTable>>,
    /// Where the latest request stands.
    pub status: ConversionStatus,
    /// Message for the latest failure, cleared on each new request.
    pub last_error: Option<String>,
    /// Token of the latest request; zero before the first one.
    pub request: u64,
}

impl ConversionState {
    /// Initial state before any base currency is requested.
    pub fn idle(base_currency: Currency) -> Self {
        Self {
            base_currency,
            rates: None,
            status: ConversionStatus::Idle,
            last_error: None,
            request: 0,
        }
    }

    /// Convert `amount`, quoted in the base currency, into `target`.
    ///
    /// Never fails: without a usable rate the amount comes back unchanged.
    pub fn convert(&self, amount: Decimal, target: &Currency) -> Decimal {
        self.convert_detailed(amount, target).amount()
    }

    /// Like [`convert`](Self::convert), reporting whether a rate was applied.
    pub fn convert_detailed(&self, amount: Decimal, target: &Currency) -> Conversion {
        let passthrough = |reason| Conversion::NoConversionApplied { amount, reason };

        if !self.status.allows_conversion() {
            return passthrough(NoConversionReason::RatesUnavailable);
        }

        if *target == self.base_currency {
            return passthrough(NoConversionReason::SameCurrency);
        }

        // A failed switch keeps the previous base's table; its rates do not
        // apply to amounts quoted in the new base.
        let Some(table) = self
            .rates
            .as_deref()
            .filter(|table| *table.base() == self.base_currency)
        else {
            return passthrough(NoConversionReason::RatesUnavailable);
        };

        let Some(rate) = table.rate(target) else {
            return passthrough(NoConversionReason::UnknownCurrency);
        };

        match amount.checked_mul(rate) {
            Some(converted) => Conversion::Converted {
                amount: converted,
                rate,
            },
            None => passthrough(NoConversionReason::Overflow),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ready_usd() -> ConversionState {
        let table = RateTable::new(
            Currency::usd(),
            [(Currency::eur(), dec!(0.92)), (Currency::inr(), dec!(83.12))],
        );
        ConversionState {
            base_currency: Currency::usd(),
            rates: Some(Arc::new(table)),
            status: ConversionStatus::Ready,
            last_error: None,
            request: 1,
        }
    }

    #[test]
    fn test_convert_ready() {
        let state = ready_usd();

        assert_eq!(state.convert(dec!(1000), &Currency::eur()), dec!(920));
        assert_eq!(
            state.convert_detailed(dec!(10), &Currency::inr()),
            Conversion::Converted {
                amount: dec!(831.2),
                rate: dec!(83.12)
            }
        );
    }

    #[test]
    fn test_identity_for_base_currency() {
        let mut state = ready_usd();
        assert_eq!(state.convert(dec!(1234.5), &Currency::usd()), dec!(1234.5));

        state.status = ConversionStatus::Failed;
        assert_eq!(
            state.convert_detailed(dec!(1234.5), &Currency::usd()),
            Conversion::NoConversionApplied {
                amount: dec!(1234.5),
                reason: NoConversionReason::SameCurrency
            }
        );
    }

    #[test]
    fn test_unknown_currency_passes_through() {
        let state = ready_usd();

        assert_eq!(
            state.convert_detailed(dec!(50), &Currency::gbp()),
            Conversion::NoConversionApplied {
                amount: dec!(50),
                reason: NoConversionReason::UnknownCurrency
            }
        );
    }

    #[test]
    fn test_loading_and_idle_pass_through() {
        let mut state = ready_usd();
        state.status = ConversionStatus::Loading;
        assert_eq!(state.convert(dec!(1000), &Currency::eur()), dec!(1000));

        let idle = ConversionState::idle(Currency::usd());
        assert_eq!(
            idle.convert_detailed(dec!(1000), &Currency::eur()),
            Conversion::NoConversionApplied {
                amount: dec!(1000),
                reason: NoConversionReason::RatesUnavailable
            }
        );
    }

    #[test]
    fn test_failed_uses_stale_rates() {
        let mut state = ready_usd();
        state.status = ConversionStatus::Failed;
        state.last_error = Some("Network error: timeout".into());

        assert_eq!(state.convert(dec!(1000), &Currency::eur()), dec!(920));
    }

    #[test]
    fn test_failed_without_table_passes_through() {
        let mut state = ConversionState::idle(Currency::usd());
        state.status = ConversionStatus::Failed;

        assert_eq!(state.convert(dec!(1000), &Currency::eur()), dec!(1000));
    }

    #[test]
    fn test_stale_table_for_other_base_passes_through() {
        let mut state = ready_usd();
        state.base_currency = Currency::gbp();
        state.status = ConversionStatus::Failed;

        assert_eq!(
            state.convert_detailed(dec!(1000), &Currency::eur()),
            Conversion::NoConversionApplied {
                amount: dec!(1000),
                reason: NoConversionReason::RatesUnavailable
            }
        );
    }

    #[test]
    fn test_overflowing_conversion_passes_through() {
        let state = ready_usd();
        let huge = Decimal::MAX / dec!(10);

        assert_eq!(state.convert(huge, &Currency::inr()), huge);
        assert_eq!(
            state.convert_detailed(huge, &Currency::inr()),
            Conversion::NoConversionApplied {
                amount: huge,
                reason: NoConversionReason::Overflow
            }
        );
    }
}
