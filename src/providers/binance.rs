//! Binance provider implementation

use crate::{
    constants::{
        BINANCE_API_URL, BINANCE_QUOTE_SUFFIX, BINANCE_TICKER_ENDPOINT, REQUEST_TIMEOUT_SECS,
        USER_AGENT,
    },
    error::ProviderError,
    provider::PriceProvider,
    types::PriceQuote,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Binance 24h ticker response for a single trading pair
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24hr {
    symbol: String,
    last_price: Option<String>,
    price_change_percent: Option<String>,
    quote_volume: Option<String>,
}

/// Binance has no batch quote endpoint, so the adapter issues one ticker
/// call per symbol against the USDT pair. A failed call for one symbol is
/// swallowed and that symbol omitted; the adapter only fails as a whole
/// when no symbol could be fetched.
pub struct BinanceProvider {
    client: Client,
}

impl BinanceProvider {
    /// Creates a new Binance provider
    pub fn new() -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProviderError::Network)?;

        Ok(Self { client })
    }

    /// Trading pair for a canonical symbol, e.g. "BTC" -> "BTCUSDT"
    fn pair(symbol: &str) -> String {
        format!("{}{}", symbol, BINANCE_QUOTE_SUFFIX)
    }

    /// Converts one ticker into a quote for the requested symbol
    ///
    /// Binance does not report market capitalization, so it stays 0.
    fn ticker_to_quote(symbol: &str, ticker: Ticker24hr) -> Option<PriceQuote> {
        if ticker.symbol.is_empty() {
            return None;
        }

        let mut quote = PriceQuote::new(symbol, parse_decimal(ticker.last_price));
        quote.change_24h = parse_decimal(ticker.price_change_percent);
        quote.volume_24h = parse_decimal(ticker.quote_volume);
        Some(quote)
    }

    /// Fetches one symbol's ticker; any failure maps to an error the caller
    /// can swallow
    async fn fetch_one(&self, symbol: &str) -> Result<PriceQuote, ProviderError> {
        let url = format!(
            "{}{}?symbol={}",
            BINANCE_API_URL,
            BINANCE_TICKER_ENDPOINT,
            Self::pair(symbol)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ProviderError::from_request)?;

        if response.status().as_u16() == 429 {
            return Err(ProviderError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            return Err(ProviderError::api_error(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body = response.text().await.map_err(ProviderError::Network)?;
        let ticker: Ticker24hr = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse Binance ticker: {}", e))
        })?;

        Self::ticker_to_quote(symbol, ticker)
            .ok_or_else(|| ProviderError::invalid_response("empty Binance ticker"))
    }
}

fn parse_decimal(value: Option<String>) -> f64 {
    value
        .and_then(|raw| raw.parse::<f64>().ok())
        .unwrap_or_default()
}

impl Default for BinanceProvider {
    fn default() -> Self {
        Self::new().expect("Failed to create Binance provider")
    }
}

#[async_trait]
impl PriceProvider for BinanceProvider {
    async fn fetch_prices(&self, symbols: &[String]) -> Result<Vec<PriceQuote>, ProviderError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let mut quotes = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            match self.fetch_one(symbol).await {
                Ok(quote) => quotes.push(quote),
                Err(e) => {
                    // partial success is valid; skip this symbol
                    tracing::debug!(symbol = %symbol, error = %e, "Binance ticker fetch failed");
                }
            }
        }

        if quotes.is_empty() {
            return Err(ProviderError::invalid_response(
                "no prices returned from Binance",
            ));
        }

        tracing::debug!(count = quotes.len(), "fetched prices from Binance");
        Ok(quotes)
    }

    fn provider_name(&self) -> &'static str {
        "binance"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_usdt_pair() {
        assert_eq!(BinanceProvider::pair("BTC"), "BTCUSDT");
        assert_eq!(BinanceProvider::pair("SOL"), "SOLUSDT");
    }

    #[test]
    fn converts_ticker_fields() {
        let body = serde_json::json!({
            "symbol": "BTCUSDT",
            "lastPrice": "45000.12",
            "priceChangePercent": "-0.8",
            "quoteVolume": "1200000000.0"
        });
        let ticker: Ticker24hr = serde_json::from_value(body).unwrap();

        let quote = BinanceProvider::ticker_to_quote("BTC", ticker).unwrap();
        assert_eq!(quote.symbol, "BTC");
        assert_eq!(quote.price, 45000.12);
        assert_eq!(quote.change_24h, -0.8);
        assert_eq!(quote.volume_24h, 1_200_000_000.0);
        // Binance supplies no market cap
        assert_eq!(quote.market_cap, 0.0);
    }

    #[test]
    fn empty_ticker_symbol_is_rejected() {
        let ticker: Ticker24hr =
            serde_json::from_value(serde_json::json!({ "symbol": "" })).unwrap();
        assert!(BinanceProvider::ticker_to_quote("BTC", ticker).is_none());
    }
}
