//! emicalc FX Service
//!
//! Holds the session's base currency and its rate table, refetches the table
//! whenever the base currency changes, and converts amounts for display.
//!
//! # Features
//!
//! - Last-request-wins fetching: responses for superseded requests are dropped
//! - Stale-but-valid rates survive a failed refresh
//! - Fail-soft conversion that never errors the caller
//! - State observation through a `tokio::sync::watch` channel
//!
//! # Example
//!
//! ```rust,ignore
//! use emicalc_fx::{ExchangeRateApiProvider, FxServiceConfig, RateConversionService};
//! use emicalc_common::Currency;
//!
//! let config = FxServiceConfig::from_env();
//! let provider = Arc::new(ExchangeRateApiProvider::from_config(&config)?);
//! let service = RateConversionService::new(provider, &config);
//!
//! service.set_base_currency(Currency::usd());
//! service.settled().await;
//!
//! let eur = service.convert(payment, &Currency::eur());
//! ```

pub mod config;
pub mod conversion;
pub mod error;
pub mod http;
pub mod provider;
pub mod service;
pub mod state;
pub mod table;

pub use config::FxServiceConfig;
pub use conversion::{Conversion, NoConversionReason};
pub use error::{FxError, FxResult};
pub use http::ExchangeRateApiProvider;
pub use provider::RateProvider;
pub use service::RateConversionService;
pub use state::{ConversionState, ConversionStatus};
pub use table::RateTable;

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateProvider;
