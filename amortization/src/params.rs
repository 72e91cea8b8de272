//! Loan input parameters.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{LoanError, LoanResult};

/// Payments are monthly.
pub const PERIODS_PER_YEAR: u32 = 12;

/// Longest supported term; keeps eager schedule generation bounded.
pub const MAX_TERM_YEARS: u32 = 100;

/// Inputs to a single payment and schedule computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Amount borrowed.
    pub principal: Decimal,
    /// Nominal annual rate in percent (8.5 means 8.5%).
    pub annual_rate_percent: Decimal,
    /// Term in whole years.
    pub term_years: u32,
}

impl LoanParameters {
    /// Create a new parameter set. No validation happens here.
    pub fn new(principal: Decimal, annual_rate_percent: Decimal, term_years: u32) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_years,
        }
    }

    /// Monthly rate as a fraction: `annual / 12 / 100`.
    pub fn periodic_rate(&self) -> Decimal {
        self.annual_rate_percent / Decimal::from(PERIODS_PER_YEAR) / Decimal::ONE_HUNDRED
    }

    /// Number of monthly payments over the term.
    pub fn total_periods(&self) -> u32 {
        self.term_years.saturating_mul(PERIODS_PER_YEAR)
    }

    /// Check the parameters, reporting the first problem found.
    pub fn validate(&self) -> LoanResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(LoanError::NonPositivePrincipal(self.principal));
        }

        if self.annual_rate_percent < Decimal::ZERO {
            return Err(LoanError::NegativeRate(self.annual_rate_percent));
        }

        if self.term_years == 0 || self.term_years > MAX_TERM_YEARS {
            return Err(LoanError::TermOutOfRange {
                term_years: self.term_years,
                max_years: MAX_TERM_YEARS,
            });
        }

        Ok(())
    }

    /// True when [`validate`](Self::validate) would succeed.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
