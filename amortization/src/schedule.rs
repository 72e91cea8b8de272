//! Amortization schedule types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One period of an amortization schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    /// 1-based period number.
    pub period: u32,
    /// Payment made this period.
    pub payment: Decimal,
    /// Part of the payment that reduces the balance.
    pub principal_portion: Decimal,
    /// Part of the payment that covers interest.
    pub interest_portion: Decimal,
    /// Balance after this period's payment, never negative.
    pub remaining_balance: Decimal,
}

/// Ordered per-period breakdown of a loan, one entry per payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmortizationSchedule {
    entries: Vec<AmortizationEntry>,
}

impl AmortizationSchedule {
    pub(crate) fn new(entries: Vec<AmortizationEntry>) -> Self {
        Self { entries }
    }

    /// Schedule with no entries, the result for invalid input.
    pub fn empty() -> Self {
        Self::default()
    }

    /// All entries in period order.
    pub fn entries(&self) -> &[AmortizationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AmortizationEntry> {
        self.entries.iter()
    }

    /// Balance after the last payment; zero for an empty schedule.
    pub fn final_balance(&self) -> Decimal {
        self.entries
            .last()
            .map(|e| e.remaining_balance)
            .unwrap_or(Decimal::ZERO)
    }

    /// Sum of every payment.
    pub fn total_payment(&self) -> Decimal {
        self.entries.iter().map(|e| e.payment).sum()
    }

    /// Sum of every interest portion.
    pub fn total_interest(&self) -> Decimal {
        self.entries.iter().map(|e| e.interest_portion).sum()
    }

    /// Sum of every principal portion.
    pub fn total_principal(&self) -> Decimal {
        self.entries.iter().map(|e| e.principal_portion).sum()
    }

    /// Rows of the zero-based `index`-th page of `per_page` rows.
    ///
    /// Pages past the end, and a `per_page` of zero, yield an empty slice.
    pub fn page(&self, index: usize, per_page: usize) -> &[AmortizationEntry] {
        let start = index.saturating_mul(per_page);
        if per_page == 0 || start >= self.entries.len() {
            return &[];
        }
        let end = start.saturating_add(per_page).min(self.entries.len());
        &self.entries[start..end]
    }

    /// Number of pages of `per_page` rows needed to show every entry.
    pub fn page_count(&self, per_page: usize) -> usize {
        if per_page == 0 {
            return 0;
        }
        self.entries.len().div_ceil(per_page)
    }
}

impl<'a> IntoIterator for &'a AmortizationSchedule {
    type Item = &'a AmortizationEntry;
    type IntoIter = std::slice::Iter<'a, AmortizationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn flat_schedule(periods: u32) -> AmortizationSchedule {
        let entries = (1..=periods)
            .map(|period| AmortizationEntry {
                period,
                payment: dec!(110),
                principal_portion: dec!(100),
                interest_portion: dec!(10),
                remaining_balance: Decimal::from(100 * (periods - period)),
            })
            .collect();
        AmortizationSchedule::new(entries)
    }

    #[test]
    fn test_totals() {
        let schedule = flat_schedule(12);

        assert_eq!(schedule.total_payment(), dec!(1320));
        assert_eq!(schedule.total_interest(), dec!(120));
        assert_eq!(schedule.total_principal(), dec!(1200));
        assert_eq!(schedule.final_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_paging() {
        let schedule = flat_schedule(12);

        assert_eq!(schedule.page_count(5), 3);
        assert_eq!(schedule.page(0, 5).len(), 5);
        assert_eq!(schedule.page(1, 5)[0].period, 6);
        assert_eq!(schedule.page(2, 5).len(), 2);
        assert!(schedule.page(3, 5).is_empty());
        assert!(schedule.page(0, 0).is_empty());
        assert!(schedule.page(usize::MAX, 10).is_empty());
    }

    #[test]
    fn test_empty_schedule() {
        let schedule = AmortizationSchedule::empty();

        assert!(schedule.is_empty());
        assert_eq!(schedule.final_balance(), Decimal::ZERO);
        assert_eq!(schedule.total_payment(), Decimal::ZERO);
        assert_eq!(schedule.page_count(10), 0);
    }

    #[test]
    fn test_serializes_as_row_array() {
        let json = serde_json::to_value(flat_schedule(2)).unwrap();

        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["period"], 1);
    }
}
