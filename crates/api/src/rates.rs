//! Exchange-rate client for dashboard consolidation.
//!
//! Rates come from a Frankfurter-compatible HTTP endpoint and are cached
//! per currency pair. The client is display-only: invoicing, payments, and
//! credit notes never call it, so an unreachable provider degrades the
//! dashboard instead of blocking billing.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use faktura_core::currency::RateQuote;
use faktura_shared::config::RateSourceConfig;
use faktura_shared::types::money::Currency;

/// Errors from the rate source.
#[derive(Debug, thiserror::Error)]
pub enum RateSourceError {
    /// The provider could not be reached or answered with an error status.
    #[error("Rate source request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered but omitted the requested pair.
    #[error("Rate source has no rate for {from}/{to}")]
    MissingRate {
        /// Base currency of the request.
        from: Currency,
        /// Quote currency of the request.
        to: Currency,
    },
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, Decimal>,
}

/// HTTP exchange-rate source with a per-pair cache.
#[derive(Debug, Clone)]
pub struct HttpRateSource {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<(Currency, Currency), RateQuote>,
}

impl HttpRateSource {
    /// Creates a rate source from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &RateSourceConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        let cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(Duration::from_secs(config.cache_secs))
            .build();
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    /// Returns a quote for converting `from` into `to`.
    ///
    /// Identical currencies short-circuit to a rate of 1; other pairs are
    /// served from cache while fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is unreachable or omits the pair.
    pub async fn quote(&self, from: Currency, to: Currency) -> Result<RateQuote, RateSourceError> {
        if from == to {
            return Ok(RateQuote {
                rate: Decimal::ONE,
                fetched_at: Utc::now(),
            });
        }
        if let Some(quote) = self.cache.get(&(from, to)).await {
            return Ok(quote);
        }
        let quote = self.fetch(from, to).await?;
        self.cache.insert((from, to), quote).await;
        Ok(quote)
    }

    async fn fetch(&self, from: Currency, to: Currency) -> Result<RateQuote, RateSourceError> {
        let url = format!("{}/latest?base={from}&symbols={to}", self.base_url);
        debug!(%from, %to, "fetching exchange rate");
        let response = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<RatesResponse>()
            .await?;
        let rate = response
            .rates
            .get(&to.to_string())
            .copied()
            .ok_or(RateSourceError::MissingRate { from, to })?;
        Ok(RateQuote {
            rate,
            fetched_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> HttpRateSource {
        HttpRateSource::new(&RateSourceConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_same_currency_needs_no_provider() {
        let quote = source().quote(Currency::Usd, Currency::Usd).await.unwrap();
        assert_eq!(quote.rate, Decimal::ONE);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = RateSourceConfig {
            base_url: "https://rates.example.com/v1/".to_string(),
            ..RateSourceConfig::default()
        };
        let source = HttpRateSource::new(&config).unwrap();
        assert_eq!(source.base_url, "https://rates.example.com/v1");
    }

    #[test]
    fn test_rates_response_parses_decimal() {
        let parsed: RatesResponse =
            serde_json::from_str(r#"{"base":"USD","rates":{"EUR":0.85}}"#).unwrap();
        assert_eq!(
            parsed.rates.get("EUR"),
            Some(&Decimal::new(85, 2)),
        );
    }
}
