//! HTTP rate provider for the ExchangeRate-API v6 `latest` endpoint.

use std::collections::HashMap;

use async_trait::async_trait;
use emicalc_common::Currency;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::config::FxServiceConfig;
use crate::error::{FxError, FxResult};
use crate::provider::RateProvider;
use crate::table::RateTable;

const GENERIC_FAILURE: &str = "Failed to fetch exchange rates";

/// Response body of `GET {api_url}/{key}/latest/{base}`.
#[derive(Debug, Deserialize)]
struct LatestResponse {
    result: String,
    #[serde(default)]
    base_code: Option<String>,
    #[serde(default)]
    conversion_rates: Option<HashMap<String, Decimal>>,
    #[serde(rename = "error-type", default)]
    error_type: Option<String>,
}

/// Rate provider backed by the ExchangeRate-API web service.
#[derive(Debug, Clone)]
pub struct ExchangeRateApiProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl ExchangeRateApiProvider {
    /// Create a provider for `api_url` authenticated with `api_key`.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> FxResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("emicalc/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FxError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Create a provider from service configuration; the API key is required.
    pub fn from_config(config: &FxServiceConfig) -> FxResult<Self> {
        config.validate().map_err(FxError::Configuration)?;

        let key = config
            .api_key
            .clone()
            .ok_or_else(|| FxError::Configuration("EXCHANGE_RATE_API_KEY is not set".to_string()))?;

        Self::new(config.api_url.clone(), key)
    }

    fn build_url(&self, base: &Currency) -> String {
        format!("{}/{}/latest/{}", self.api_url, self.api_key, base.code())
    }
}

#[async_trait]
impl RateProvider for ExchangeRateApiProvider {
    fn name(&self) -> &str {
        "exchangerate-api"
    }

    async fn fetch_rates(&self, base: &Currency) -> FxResult<RateTable> {
        let base = Currency::parse(base.code())?;

        // The URL embeds the API key; log the base only.
        debug!(base = %base, "Requesting rate table");

        let response = self
            .client
            .get(self.build_url(&base))
            .send()
            .await
            .map_err(|e| FxError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FxError::Network(e.without_url().to_string()))?;

        parse_latest(&base, status.as_u16(), &body)
    }
}

/// Interpret a `latest` response body for `base`.
fn parse_latest(base: &Currency, status: u16, body: &str) -> FxResult<RateTable> {
    let response: LatestResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(_) if !(200..300).contains(&status) => {
            return Err(FxError::Network(format!("HTTP status {status}")));
        }
        Err(e) => return Err(FxError::MalformedPayload(e.to_string())),
    };

    if response.result != "success" {
        return Err(FxError::ProviderError(
            response
                .error_type
                .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
        ));
    }

    if let Some(code) = &response.base_code {
        if !code.eq_ignore_ascii_case(base.code()) {
            return Err(FxError::MalformedPayload(format!(
                "requested {base}, received {code}"
            )));
        }
    }

    let raw = response
        .conversion_rates
        .ok_or_else(|| FxError::MalformedPayload("missing conversion_rates".to_string()))?;

    let mut rates = Vec::with_capacity(raw.len());
    for (code, rate) in raw {
        let currency = Currency::parse(&code)
            .map_err(|e| FxError::MalformedPayload(e.to_string()))?;
        if rate <= Decimal::ZERO {
            return Err(FxError::MalformedPayload(format!(
                "non-positive rate {rate} for {currency}"
            )));
        }
        rates.push((currency, rate));
    }

    Ok(RateTable::new(base.clone(), rates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd() -> Currency {
        Currency::usd()
    }

    #[test]
    fn test_parse_success() {
        let body = r#"{
            "result": "success",
            "documentation": "https://www.exchangerate-api.com/docs",
            "time_last_update_unix": 1585267200,
            "base_code": "USD",
            "conversion_rates": {"USD": 1, "EUR": 0.9216, "INR": 83.1245}
        }"#;

        let table = parse_latest(&usd(), 200, body).unwrap();

        assert_eq!(table.base(), &usd());
        assert_eq!(table.len(), 3);
        assert_eq!(table.rate(&usd()), Some(dec!(1)));
        let eur = table.rate(&Currency::eur()).unwrap();
        assert!((eur - dec!(0.9216)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_parse_provider_error() {
        let body = r#"{"result": "error", "error-type": "invalid-key"}"#;

        assert_eq!(
            parse_latest(&usd(), 403, body),
            Err(FxError::ProviderError("invalid-key".to_string()))
        );

        let body = r#"{"result": "error"}"#;
        assert_eq!(
            parse_latest(&usd(), 200, body),
            Err(FxError::ProviderError(GENERIC_FAILURE.to_string()))
        );
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_latest(&usd(), 200, "<html>oops</html>"),
            Err(FxError::MalformedPayload(_))
        ));
        assert!(matches!(
            parse_latest(&usd(), 200, r#"{"result": "success"}"#),
            Err(FxError::MalformedPayload(_))
        ));
        assert!(matches!(
            parse_latest(
                &usd(),
                200,
                r#"{"result": "success", "base_code": "EUR", "conversion_rates": {"USD": 1.08}}"#
            ),
            Err(FxError::MalformedPayload(_))
        ));
        assert!(matches!(
            parse_latest(
                &usd(),
                200,
                r#"{"result": "success", "conversion_rates": {"EUR": -1}}"#
            ),
            Err(FxError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_non_json_error_status_is_network_failure() {
        assert_eq!(
            parse_latest(&usd(), 502, "Bad Gateway"),
            Err(FxError::Network("HTTP status 502".to_string()))
        );
    }

    #[test]
    fn test_url_layout() {
        let provider = ExchangeRateApiProvider::new("https://example.test/v6/", "k3y").unwrap();

        assert_eq!(
            provider.build_url(&Currency::eur()),
            "https://example.test/v6/k3y/latest/EUR"
        );
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = FxServiceConfig::default();

        assert!(matches!(
            ExchangeRateApiProvider::from_config(&config),
            Err(FxError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_base_rejected_before_request() {
        let provider = ExchangeRateApiProvider::new("http://127.0.0.1:9", "k").unwrap();

        let result = provider.fetch_rates(&Currency::new("US/D")).await;

        assert!(matches!(result, Err(FxError::InvalidCurrency(_))));
    }
}
