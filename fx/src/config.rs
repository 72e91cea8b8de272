//! FX service configuration.

use std::time::Duration;

use emicalc_common::Currency;

/// Configuration for the rate conversion service and its HTTP provider.
#[derive(Debug, Clone)]
pub struct FxServiceConfig {
    /// Root of the rate API, without the key or path suffix.
    pub api_url: String,
    /// API credential embedded in each request path.
    pub api_key: Option<String>,
    /// Upper bound on a single rate fetch.
    pub fetch_timeout: Duration,
    /// Base currency reported before the first request.
    pub initial_base: Currency,
}

impl Default for FxServiceConfig {
    fn default() -> Self {
        Self {
            api_url: "https://v6.exchangerate-api.com/v6".to_string(),
            api_key: None,
            fetch_timeout: Duration::from_secs(10),
            initial_base: Currency::usd(),
        }
    }
}

impl FxServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("EXCHANGE_RATE_API_URL") {
            config.api_url = url;
        }

        if let Some(key) = lookup("EXCHANGE_RATE_API_KEY") {
            config.api_key = Some(key);
        }

        if let Some(ms) = lookup("FX_FETCH_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                config.fetch_timeout = Duration::from_millis(ms);
            }
        }

        if let Some(code) = lookup("FX_BASE_CURRENCY") {
            if let Ok(base) = Currency::parse(&code) {
                config.initial_base = base;
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_url.is_empty() {
            return Err("Rate API URL cannot be empty".to_string());
        }

        if self.fetch_timeout.is_zero() {
            return Err("Fetch timeout cannot be zero".to_string());
        }

        if matches!(&self.api_key, Some(key) if key.trim().is_empty()) {
            return Err("Rate API key cannot be blank".to_string());
        }

        Ok(())
    }
}
