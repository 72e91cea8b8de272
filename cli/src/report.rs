//! Loan and rate reports in display currency.

use std::fmt::Write;

use emicalc_amortization::{AmortizationEntry, LoanQuote};
use emicalc_common::{Currency, Money};
use emicalc_fx::RateTable;
use rust_decimal::Decimal;
use serde::Serialize;

/// One schedule row with every amount in display currency.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub period: u32,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    pub balance: Money,
}

/// Summary and schedule page of a loan, converted for display.
#[derive(Debug, Clone, Serialize)]
pub struct LoanReport {
    pub currency: Currency,
    pub payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    pub periods: usize,
    pub rows: Vec<ReportRow>,
}

impl LoanReport {
    /// Build a report for `rows` of `quote`, passing every amount through
    /// `convert` and rounding to `currency`'s minor unit.
    pub fn build(
        quote: &LoanQuote,
        rows: &[AmortizationEntry],
        currency: Currency,
        convert: impl Fn(Decimal) -> Decimal,
    ) -> Self {
        let money = |value: Decimal| Money::new(convert(value), currency.clone()).round();

        Self {
            payment: money(quote.payment),
            total_payment: money(quote.total_payment()),
            total_interest: money(quote.total_interest()),
            periods: quote.schedule.len(),
            rows: rows
                .iter()
                .map(|e| ReportRow {
                    period: e.period,
                    payment: money(e.payment),
                    principal: money(e.principal_portion),
                    interest: money(e.interest_portion),
                    balance: money(e.remaining_balance),
                })
                .collect(),
            currency,
        }
    }

    /// Plain-text rendering: summary lines followed by the row table.
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Monthly EMI     {}", self.payment);
        let _ = writeln!(out, "Total Payment   {}", self.total_payment);
        let _ = writeln!(out, "Total Interest  {}", self.total_interest);

        if self.rows.is_empty() {
            return out;
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:>6}  {:>18}  {:>18}  {:>18}  {:>18}",
            "Month", "EMI", "Principal", "Interest", "Balance"
        );
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{:>6}  {:>18}  {:>18}  {:>18}  {:>18}",
                row.period,
                row.payment.to_string(),
                row.principal.to_string(),
                row.interest.to_string(),
                row.balance.to_string()
            );
        }
        let _ = writeln!(out, "({} of {} months shown)", self.rows.len(), self.periods);

        out
    }
}

/// Plain-text listing of the rates matching `search`, one page at a time.
pub fn render_rates(table: &RateTable, search: &str, page: usize, per_page: usize) -> String {
    let matches = table.search(search);
    let mut out = String::new();

    let _ = writeln!(out, "1 {} equals:", table.base());

    if matches.is_empty() {
        let _ = writeln!(out, "No currencies found matching {search:?}");
        return out;
    }

    let per_page = per_page.max(1);
    let pages = matches.len().div_ceil(per_page);
    if page >= pages {
        let _ = writeln!(
            out,
            "Page {page} is out of range; {} currencies fill {pages} pages",
            matches.len()
        );
        return out;
    }

    let start = page * per_page;
    let end = start.saturating_add(per_page).min(matches.len());
    for (code, rate) in &matches[start..end] {
        let _ = writeln!(out, "{:<5} {:>18.6}", code.code(), rate.round_dp(6));
    }
    let _ = writeln!(
        out,
        "({}-{} of {} currencies, fetched {})",
        (start + 1).min(end),
        end,
        matches.len(),
        table.fetched_at().format("%Y-%m-%d %H:%M:%S UTC")
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use emicalc_amortization::{amortize, LoanParameters};
    use rust_decimal_macros::dec;

    fn quote() -> LoanQuote {
        amortize(&LoanParameters::new(dec!(100000), dec!(8.5), 5))
    }

    #[test]
    fn test_report_in_base_currency() {
        let quote = quote();
        let report = LoanReport::build(&quote, quote.schedule.page(0, 3), Currency::usd(), |v| v);

        assert_eq!(report.payment.value, dec!(2051.65));
        assert_eq!(report.total_interest.value, dec!(23099.19));
        assert_eq!(report.periods, 60);
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[0].interest.value, dec!(708.33));

        let text = report.render();
        assert!(text.contains("Monthly EMI     2051.65 USD"));
        assert!(text.contains("(3 of 60 months shown)"));
    }

    #[test]
    fn test_report_converts_every_amount() {
        let quote = quote();
        let report = LoanReport::build(&quote, quote.schedule.entries(), Currency::jpy(), |v| {
            v * dec!(150)
        });

        assert_eq!(report.currency, Currency::jpy());
        assert_eq!(report.payment.value, dec!(307748));
        assert_eq!(report.rows.len(), 60);
        assert_eq!(report.rows[59].balance.value, Decimal::ZERO);
    }

    #[test]
    fn test_empty_quote_renders_summary_only() {
        let quote = amortize(&LoanParameters::new(dec!(0), dec!(8.5), 5));
        let report = LoanReport::build(&quote, quote.schedule.entries(), Currency::usd(), |v| v);

        let text = report.render();
        assert!(text.contains("Monthly EMI     0.00 USD"));
        assert!(!text.contains("Month "));
    }

    #[test]
    fn test_render_rates() {
        let table = RateTable::new(
            Currency::usd(),
            [
                (Currency::eur(), dec!(0.9216)),
                (Currency::new("EGP"), dec!(47.6)),
                (Currency::inr(), dec!(83.1245)),
            ],
        );

        let text = render_rates(&table, "e", 0, 10);
        assert!(text.starts_with("1 USD equals:"));
        assert!(text.contains("EGP"));
        assert!(text.contains("0.921600"));
        assert!(!text.contains("INR"));
        assert!(text.contains("(1-2 of 2 currencies"));

        let text = render_rates(&table, "zzz", 0, 10);
        assert!(text.contains("No currencies found"));
    }

    #[test]
    fn test_render_rates_page_past_end() {
        let table = RateTable::new(
            Currency::usd(),
            [
                (Currency::eur(), dec!(0.92)),
                (Currency::gbp(), dec!(0.79)),
                (Currency::inr(), dec!(83.12)),
            ],
        );

        let text = render_rates(&table, "", 1, 2);
        assert!(text.contains("INR"));
        assert!(text.contains("(3-3 of 3 currencies"));

        let text = render_rates(&table, "", 2, 2);
        assert!(text.contains("Page 2 is out of range; 3 currencies fill 2 pages"));
        assert!(!text.contains("of 3 currencies,"));
        assert!(!text.contains("EUR"));
    }
}
