//! Monetary types for emicalc.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CurrencyError, Result};

/// A monetary amount tagged with the currency it is displayed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount value (high precision decimal).
    pub value: Decimal,
    /// ISO 4217 currency code.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money instance.
    pub fn new(value: Decimal, currency: Currency) -> Self {
        Self { value, currency }
    }

    /// Round to the currency's standard decimal places.
    pub fn round(&self) -> Self {
        let places = self.currency.decimal_places();
        Self {
            value: self.value.round_dp(places),
            currency: self.currency.clone(),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let places = self.currency.decimal_places();
        write!(
            f,
            "{:.*} {}",
            places as usize,
            self.value.round_dp(places),
            self.currency
        )
    }
}

/// ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    ///
    /// The code is upper-cased but otherwise taken as given; use
    /// [`Currency::parse`] for untrusted input.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// Parse a code, requiring exactly three ASCII letters.
    pub fn parse(code: &str) -> Result<Self> {
        let trimmed = code.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyError::InvalidCode(code.to_string()));
        }
        Ok(Self::new(trimmed))
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Get the standard decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self.0.as_str() {
            "JPY" | "KRW" | "VND" => 0,
            "BHD" | "KWD" | "OMR" => 3,
            _ => 2,
        }
    }

    /// Common currencies
    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn gbp() -> Self {
        Self::new("GBP")
    }

    pub fn jpy() -> Self {
        Self::new("JPY")
    }

    pub fn inr() -> Self {
        Self::new("INR")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_round_and_display() {
        let eur = Money::new(dec!(2051.653132), Currency::eur());
        assert_eq!(eur.round().value, dec!(2051.65));
        assert_eq!(eur.to_string(), "2051.65 EUR");

        let yen = Money::new(dec!(310000.4), Currency::jpy());
        assert_eq!(yen.to_string(), "310000 JPY");
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!(Currency::parse(" usd ").unwrap(), Currency::usd());
        assert_eq!("Inr".parse::<Currency>().unwrap(), Currency::inr());

        assert!(matches!(
            Currency::parse("US"),
            Err(CurrencyError::InvalidCode(_))
        ));
        assert!(Currency::parse("US/").is_err());
        assert!(Currency::parse("EURO").is_err());
    }

    #[test]
    fn test_currency_decimal_places() {
        assert_eq!(Currency::usd().decimal_places(), 2);
        assert_eq!(Currency::eur().decimal_places(), 2);
        assert_eq!(Currency::jpy().decimal_places(), 0);
    }

    #[test]
    fn test_currency_serializes_as_code() {
        let json = serde_json::to_string(&Currency::gbp()).unwrap();
        assert_eq!(json, "\"GBP\"");
    }
}
