//! emicalc Amortization Engine
//!
//! Periodic payment (EMI) and amortization schedule for fixed-rate
//! installment loans with monthly payments.
//!
//! Every operation is a pure function of its inputs: no shared state, no
//! locking, safe to call from any thread.
//!
//! # Example
//!
//! ```rust
//! use emicalc_amortization::{amortize, LoanParameters};
//! use rust_decimal::Decimal;
//!
//! let params = LoanParameters::new(Decimal::from(100_000), Decimal::new(85, 1), 5);
//! let quote = amortize(&params);
//!
//! assert_eq!(quote.schedule.len(), 60);
//! assert!(quote.schedule.final_balance().is_zero());
//! ```

pub mod engine;
pub mod params;
pub mod schedule;
pub mod error;

pub use engine::{amortize, compute_payment, generate_schedule, try_amortize, LoanQuote};
pub use params::{LoanParameters, MAX_TERM_YEARS, PERIODS_PER_YEAR};
pub use schedule::{AmortizationEntry, AmortizationSchedule};
pub use error::{LoanError, LoanResult};
