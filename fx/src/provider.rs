//! Rate provider trait and test double.

use async_trait::async_trait;
use emicalc_common::Currency;

use crate::error::FxResult;
use crate::table::RateTable;

/// Source of full rate tables keyed by base currency.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Fetch every rate quoted against `base`.
    async fn fetch_rates(&self, base: &Currency) -> FxResult<RateTable>;
}

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockRateProvider;

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use dashmap::DashMap;
    use emicalc_common::Currency;

    use super::RateProvider;
    use crate::error::{FxError, FxResult};
    use crate::table::RateTable;

    /// Mock rate provider for testing.
    ///
    /// Serves canned tables, with optional per-base delays and failures.
    pub struct MockRateProvider {
        name: String,
        tables: DashMap<Currency, RateTable>,
        failures: DashMap<Currency, FxError>,
        delays: DashMap<Currency, Duration>,
        calls: AtomicUsize,
    }

    impl MockRateProvider {
        /// Create a new mock provider.
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                tables: DashMap::new(),
                failures: DashMap::new(),
                delays: DashMap::new(),
                calls: AtomicUsize::new(0),
            }
        }

        /// Serve `table` for its base currency.
        pub fn set_table(&self, table: RateTable) {
            self.tables.insert(table.base().clone(), table);
        }

        /// Fail every fetch for `base` with `error`.
        pub fn fail_with(&self, base: Currency, error: FxError) {
            self.failures.insert(base, error);
        }

        /// Stop failing fetches for `base`.
        pub fn clear_failure(&self, base: &Currency) {
            self.failures.remove(base);
        }

        /// Sleep for `delay` before answering fetches for `base`.
        pub fn set_delay(&self, base: Currency, delay: Duration) {
            self.delays.insert(base, delay);
        }

        /// Number of fetches served so far.
        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateProvider for MockRateProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch_rates(&self, base: &Currency) -> FxResult<RateTable> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let delay = self.delays.get(base).map(|d| *d);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if let Some(error) = self.failures.get(base) {
                return Err(error.value().clone());
            }

            self.tables
                .get(base)
                .map(|t| t.value().clone())
                .ok_or_else(|| FxError::RateNotAvailable(base.clone()))
        }
    }
}
