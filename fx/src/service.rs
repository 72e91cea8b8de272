//! Rate conversion service.

use std::sync::Arc;
use std::time::Duration;

use emicalc_common::Currency;
use rust_decimal::Decimal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::config::FxServiceConfig;
use crate::conversion::Conversion;
use crate::error::{FxError, FxResult};
use crate::provider::RateProvider;
use crate::state::{ConversionState, ConversionStatus};
use crate::table::RateTable;

struct Inner {
    provider: Arc<dyn RateProvider>,
    fetch_timeout: Duration,
    state: watch::Sender<ConversionState>,
}

/// Owns the session's base currency and rate table.
///
/// Cloning yields another handle to the same state. The only mutator is
/// [`set_base_currency`](Self::set_base_currency); observers use
/// [`subscribe`](Self::subscribe).
#[derive(Clone)]
pub struct RateConversionService {
    inner: Arc<Inner>,
}

impl RateConversionService {
    /// Create an idle service that will fetch from `provider`.
    pub fn new(provider: Arc<dyn RateProvider>, config: &FxServiceConfig) -> Self {
        let (state, _) = watch::channel(ConversionState::idle(config.initial_base.clone()));

        Self {
            inner: Arc::new(Inner {
                provider,
                fetch_timeout: config.fetch_timeout,
                state,
            }),
        }
    }

    /// Switch the base currency and fetch its rate table.
    ///
    /// The state enters `Loading` immediately. The returned task settles it
    /// to `Ready` or `Failed`, unless a later call has superseded this one,
    /// in which case its result is dropped. Must be called from within a
    /// Tokio runtime.
    #[instrument(skip_all, fields(base = %base))]
    pub fn set_base_currency(&self, base: Currency) -> JoinHandle<()> {
        let mut token = 0;
        self.inner.state.send_modify(|state| {
            state.request += 1;
            token = state.request;
            state.base_currency = base.clone();
            state.status = ConversionStatus::Loading;
            state.last_error = None;
        });

        info!(token, provider = self.inner.provider.name(), "Base currency changed, fetching rates");

        let inner = self.inner.clone();
        tokio::spawn(async move { inner.refresh(base, token).await })
    }

    /// Convert `amount`, quoted in the base currency, into `target`.
    ///
    /// Returns `amount` unchanged while loading, before the first table, for
    /// the base currency itself and for codes missing from the table.
    pub fn convert(&self, amount: Decimal, target: &Currency) -> Decimal {
        self.inner.state.borrow().convert(amount, target)
    }

    /// Like [`convert`](Self::convert), reporting whether a rate was applied.
    pub fn convert_detailed(&self, amount: Decimal, target: &Currency) -> Conversion {
        self.inner.state.borrow().convert_detailed(amount, target)
    }

    /// Current state snapshot.
    pub fn state(&self) -> ConversionState {
        ConversionState::clone(&self.inner.state.borrow())
    }

    pub fn status(&self) -> ConversionStatus {
        self.inner.state.borrow().status
    }

    pub fn base_currency(&self) -> Currency {
        self.inner.state.borrow().base_currency.clone()
    }

    /// Receiver notified on every state transition.
    pub fn subscribe(&self) -> watch::Receiver<ConversionState> {
        self.inner.state.subscribe()
    }

    /// Wait until the latest request is no longer loading.
    pub async fn settled(&self) -> ConversionState {
        let mut rx = self.subscribe();
        let settled = rx
            .wait_for(|state| state.status != ConversionStatus::Loading)
            .await
            .map(|state| ConversionState::clone(&state));

        // The sender lives as long as `self`, so the wait cannot be cut short.
        settled.unwrap_or_else(|_| self.state())
    }
}

impl Inner {
    async fn refresh(&self, base: Currency, token: u64) {
        let result = self.fetch(&base).await;
        let outcome = result
            .as_ref()
            .map(RateTable::len)
            .map_err(|e| (e.to_string(), e.is_retryable()));

        let applied = self.state.send_if_modified(|state| {
            if state.request != token {
                return false;
            }
            match result {
                Ok(table) => {
                    state.rates = Some(Arc::new(table));
                    state.status = ConversionStatus::Ready;
                    state.last_error = None;
                }
                Err(e) => {
                    state.status = ConversionStatus::Failed;
                    state.last_error = Some(e.to_string());
                }
            }
            true
        });

        if !applied {
            debug!(base = %base, token, "Discarding rates for superseded request");
            return;
        }

        match outcome {
            Ok(count) => info!(base = %base, token, currencies = count, "Rates loaded"),
            Err((error, retryable)) => warn!(
                base = %base,
                token,
                error = %error,
                retryable,
                "Rate fetch failed, keeping previous rates"
            ),
        }
    }

    async fn fetch(&self, base: &Currency) -> FxResult<RateTable> {
        let table = tokio::time::timeout(self.fetch_timeout, self.provider.fetch_rates(base))
            .await
            .map_err(|_| FxError::Timeout(self.fetch_timeout))??;

        if table.base() != base {
            return Err(FxError::MalformedPayload(format!(
                "requested {base}, received {}",
                table.base()
            )));
        }

        Ok(table)
    }
}
