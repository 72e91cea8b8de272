//! Rate table for a single base currency.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use emicalc_common::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Snapshot of exchange rates quoted against one base currency.
///
/// Each rate is the value of one unit of `base` in the keyed currency. A
/// table is never patched; a new base currency gets a new table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    base: Currency,
    rates: BTreeMap<Currency, Decimal>,
    fetched_at: DateTime<Utc>,
}

impl RateTable {
    /// Create a table stamped with the current time.
    pub fn new(base: Currency, rates: impl IntoIterator<Item = (Currency, Decimal)>) -> Self {
        Self {
            base,
            rates: rates.into_iter().collect(),
            fetched_at: Utc::now(),
        }
    }

    /// Currency every rate is quoted against.
    pub fn base(&self) -> &Currency {
        &self.base
    }

    /// When the quote was received.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Rate for one unit of base in `currency`.
    pub fn rate(&self, currency: &Currency) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }

    pub fn contains(&self, currency: &Currency) -> bool {
        self.rates.contains_key(currency)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Rates in ascending currency-code order.
    pub fn iter(&self) -> impl Iterator<Item = (&Currency, Decimal)> {
        self.rates.iter().map(|(code, rate)| (code, *rate))
    }

    /// Rates whose code contains `term`, ignoring case, in code order.
    ///
    /// An empty term matches every rate.
    pub fn search(&self, term: &str) -> Vec<(&Currency, Decimal)> {
        let needle = term.trim().to_uppercase();
        self.iter()
            .filter(|(code, _)| code.code().contains(&needle))
            .collect()
    }
}
