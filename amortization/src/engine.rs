//! Payment formula and schedule generation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LoanError, LoanResult};
use crate::params::{LoanParameters, MAX_TERM_YEARS, PERIODS_PER_YEAR};
use crate::schedule::{AmortizationEntry, AmortizationSchedule};

/// Residual below which the last balance is treated as rounding drift.
const FINAL_BALANCE_TOLERANCE: Decimal = Decimal::ONE;

/// Payment and schedule for one set of loan parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanQuote {
    /// Inputs the quote was computed from.
    pub parameters: LoanParameters,
    /// Fixed periodic payment (EMI).
    pub payment: Decimal,
    /// Per-period breakdown.
    pub schedule: AmortizationSchedule,
}

impl LoanQuote {
    fn empty(parameters: LoanParameters) -> Self {
        Self {
            parameters,
            payment: Decimal::ZERO,
            schedule: AmortizationSchedule::empty(),
        }
    }

    /// Sum of all payments over the term.
    pub fn total_payment(&self) -> Decimal {
        self.schedule.total_payment()
    }

    /// Sum of all interest over the term.
    pub fn total_interest(&self) -> Decimal {
        self.schedule.total_interest()
    }

    /// True when the inputs were rejected and nothing was computed.
    pub fn is_empty(&self) -> bool {
        self.schedule.is_empty()
    }
}

/// Periodic payment for a loan.
///
/// Returns zero for a non-positive principal, a negative rate, or a term
/// outside `1..=MAX_TERM_YEARS`.
pub fn compute_payment(principal: Decimal, annual_rate_percent: Decimal, term_years: u32) -> Decimal {
    let params = LoanParameters::new(principal, annual_rate_percent, term_years);
    periodic_payment(&params).unwrap_or(Decimal::ZERO)
}

/// Build the per-period schedule for a known payment.
///
/// Returns an empty schedule for a non-positive principal, payment or period
/// count, a negative rate, more periods than `MAX_TERM_YEARS` allows, or
/// amounts that leave the decimal range. The last entry's balance is always
/// exactly zero.
pub fn generate_schedule(
    principal: Decimal,
    periodic_rate: Decimal,
    total_periods: u32,
    payment: Decimal,
) -> AmortizationSchedule {
    if principal <= Decimal::ZERO
        || payment <= Decimal::ZERO
        || periodic_rate < Decimal::ZERO
        || total_periods == 0
        || total_periods > MAX_TERM_YEARS * PERIODS_PER_YEAR
    {
        return AmortizationSchedule::empty();
    }

    let mut entries = Vec::with_capacity(total_periods as usize);
    let mut balance = principal;
    // Running payment, interest and principal sums; keeps the schedule's
    // totals inside the decimal range.
    let mut totals = [Decimal::ZERO; 3];

    for period in 1..=total_periods {
        let Some(interest) = balance.checked_mul(periodic_rate) else {
            warn!(period, balance = %balance, "Interest overflowed, dropping schedule");
            return AmortizationSchedule::empty();
        };
        let Some((principal_portion, next)) = payment
            .checked_sub(interest)
            .and_then(|portion| Some((portion, balance.checked_sub(portion)?)))
        else {
            warn!(period, balance = %balance, "Balance overflowed, dropping schedule");
            return AmortizationSchedule::empty();
        };
        balance = next;

        if !accumulate(&mut totals, [payment, interest, principal_portion]) {
            warn!(period, "Schedule totals overflowed, dropping schedule");
            return AmortizationSchedule::empty();
        }

        if period == total_periods {
            balance = settle_final_balance(balance);
        }

        entries.push(AmortizationEntry {
            period,
            payment,
            principal_portion,
            interest_portion: interest,
            remaining_balance: balance.max(Decimal::ZERO),
        });
    }

    AmortizationSchedule::new(entries)
}

/// Payment and schedule in one call, fail-soft.
///
/// Invalid parameters yield a zero payment and an empty schedule.
pub fn amortize(params: &LoanParameters) -> LoanQuote {
    match try_amortize(params) {
        Ok(quote) => quote,
        Err(e) => {
            debug!(error = %e, "Loan input rejected, returning empty quote");
            LoanQuote::empty(*params)
        }
    }
}

/// Payment and schedule in one call, surfacing invalid input.
pub fn try_amortize(params: &LoanParameters) -> LoanResult<LoanQuote> {
    let payment = periodic_payment(params)?;
    let schedule = generate_schedule(
        params.principal,
        params.periodic_rate(),
        params.total_periods(),
        payment,
    );

    if schedule.is_empty() {
        return Err(LoanError::Overflow {
            rate: params.annual_rate_percent,
            periods: params.total_periods(),
        });
    }

    debug!(
        periods = schedule.len(),
        payment = %payment,
        "Computed amortization schedule"
    );

    Ok(LoanQuote {
        parameters: *params,
        payment,
        schedule,
    })
}

fn periodic_payment(params: &LoanParameters) -> LoanResult<Decimal> {
    params.validate()?;

    let rate = params.periodic_rate();
    let periods = params.total_periods();

    if rate.is_zero() {
        return Ok(params.principal / Decimal::from(periods));
    }

    let overflow = || LoanError::Overflow {
        rate: params.annual_rate_percent,
        periods,
    };

    let factor = compound(rate, periods).ok_or_else(overflow)?;
    let payment = params
        .principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(factor - Decimal::ONE))
        .ok_or_else(overflow)?;

    Ok(payment)
}

/// (1 + r)^n by repeated multiplication; `None` on overflow.
fn compound(rate: Decimal, periods: u32) -> Option<Decimal> {
    let base = Decimal::ONE + rate;
    let mut result = Decimal::ONE;
    for _ in 0..periods {
        result = result.checked_mul(base)?;
    }
    Some(result)
}

/// Add `amounts` into `totals` element-wise; false if any sum overflows.
fn accumulate(totals: &mut [Decimal; 3], amounts: [Decimal; 3]) -> bool {
    for (total, amount) in totals.iter_mut().zip(amounts) {
        match total.checked_add(amount) {
            Some(sum) => *total = sum,
            None => return false,
        }
    }
    true
}

fn settle_final_balance(balance: Decimal) -> Decimal {
    if balance.abs() >= FINAL_BALANCE_TOLERANCE {
        warn!(
            residual = %balance,
            tolerance = %FINAL_BALANCE_TOLERANCE,
            "Final balance residual exceeds rounding tolerance"
        );
    }
    Decimal::ZERO
}
