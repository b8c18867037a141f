//! CoinGecko provider implementation

use crate::{
    constants::{
        COINGECKO_API_URL, COINGECKO_GLOBAL_ENDPOINT, COINGECKO_SIMPLE_PRICE_ENDPOINT,
        FALLBACK_FEAR_GREED_INDEX, REQUEST_TIMEOUT_SECS, USER_AGENT,
    },
    error::ProviderError,
    provider::{OverviewSource, PriceProvider},
    symbols,
    types::{MarketOverview, PriceQuote},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// CoinGecko response for batch simple price queries, keyed by asset id
#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    #[serde(flatten)]
    coins: HashMap<String, CoinEntry>,
}

#[derive(Debug, Deserialize)]
struct CoinEntry {
    usd: Option<f64>,
    usd_24h_change: Option<f64>,
    usd_market_cap: Option<f64>,
    usd_24h_vol: Option<f64>,
}

/// CoinGecko response for the /global endpoint
#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalData,
}

#[derive(Debug, Deserialize)]
struct GlobalData {
    total_market_cap: HashMap<String, f64>,
    total_volume: HashMap<String, f64>,
    market_cap_percentage: HashMap<String, f64>,
}

/// CoinGecko provider: one batch call per fetch, asset ids mapped through
/// the static symbol table
pub struct CoinGeckoProvider {
    client: Client,
}

impl CoinGeckoProvider {
    /// Creates a new CoinGecko provider
    pub fn new() -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProviderError::Network)?;

        Ok(Self { client })
    }

    /// Builds the batch price URL for the mappable subset of `symbols`
    ///
    /// Returns None when no requested symbol has a CoinGecko id.
    fn build_price_url(&self, symbols: &[String]) -> Option<String> {
        let ids = symbols
            .iter()
            .filter_map(|symbol| symbols::coingecko_id(symbol))
            .collect::<Vec<_>>()
            .join(",");

        if ids.is_empty() {
            return None;
        }

        Some(format!(
            "{}{}?ids={}&vs_currencies=usd&include_24hr_change=true&include_market_cap=true&include_24hr_vol=true",
            COINGECKO_API_URL, COINGECKO_SIMPLE_PRICE_ENDPOINT, ids
        ))
    }

    /// Maps the id-keyed response back to ticker-keyed quotes
    ///
    /// Ids without a reverse mapping are dropped; missing numeric fields
    /// default to 0.
    fn parse_response(&self, response: SimplePriceResponse) -> Vec<PriceQuote> {
        let mut result = Vec::with_capacity(response.coins.len());

        for (id, entry) in response.coins {
            if let Some(symbol) = symbols::symbol_for_coingecko_id(&id) {
                let mut quote = PriceQuote::new(symbol, entry.usd.unwrap_or_default());
                quote.change_24h = entry.usd_24h_change.unwrap_or_default();
                quote.market_cap = entry.usd_market_cap.unwrap_or_default();
                quote.volume_24h = entry.usd_24h_vol.unwrap_or_default();
                result.push(quote);
            }
        }

        result
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new().expect("Failed to create CoinGecko provider")
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoProvider {
    async fn fetch_prices(&self, symbols: &[String]) -> Result<Vec<PriceQuote>, ProviderError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let url = self
            .build_price_url(symbols)
            .ok_or_else(|| ProviderError::invalid_response("no mappable symbols for CoinGecko"))?;
        tracing::debug!(url = %url, "fetching prices from CoinGecko");

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
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let body = response.text().await.map_err(ProviderError::Network)?;
        let parsed: SimplePriceResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse CoinGecko response: {}", e))
        })?;

        let quotes = self.parse_response(parsed);
        if quotes.is_empty() {
            return Err(ProviderError::invalid_response(
                "no prices returned from CoinGecko",
            ));
        }

        tracing::debug!(count = quotes.len(), "fetched prices from CoinGecko");
        Ok(quotes)
    }

    fn provider_name(&self) -> &'static str {
        "coingecko"
    }
}

#[async_trait]
impl OverviewSource for CoinGeckoProvider {
    async fn fetch_overview(&self) -> Result<MarketOverview, ProviderError> {
        let url = format!("{}{}", COINGECKO_API_URL, COINGECKO_GLOBAL_ENDPOINT);
        tracing::debug!(url = %url, "fetching market overview from CoinGecko");

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
        let parsed: GlobalResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse CoinGecko global: {}", e))
        })?;

        Ok(MarketOverview {
            total_market_cap: parsed.data.total_market_cap.get("usd").copied().unwrap_or_default(),
            total_volume_24h: parsed.data.total_volume.get("usd").copied().unwrap_or_default(),
            btc_dominance: parsed
                .data
                .market_cap_percentage
                .get("btc")
                .copied()
                .unwrap_or_default(),
            // /global carries no sentiment data; serve the neutral default
            fear_greed_index: FALLBACK_FEAR_GREED_INDEX,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> CoinGeckoProvider {
        CoinGeckoProvider::new().unwrap()
    }

    #[test]
    fn parses_batch_response_and_maps_ids_back() {
        let body = serde_json::json!({
            "bitcoin": {
                "usd": 45000.0,
                "usd_24h_change": 2.1,
                "usd_market_cap": 880_000_000_000.0,
                "usd_24h_vol": 21_000_000_000.0
            },
            "ethereum": { "usd": 2800.0 },
            "some-unknown-id": { "usd": 1.0 }
        });
        let parsed: SimplePriceResponse = serde_json::from_value(body).unwrap();

        let mut quotes = provider().parse_response(parsed);
        quotes.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].symbol, "BTC");
        assert_eq!(quotes[0].price, 45000.0);
        assert_eq!(quotes[0].change_24h, 2.1);
        // missing optional fields default to 0
        assert_eq!(quotes[1].symbol, "ETH");
        assert_eq!(quotes[1].market_cap, 0.0);
        assert_eq!(quotes[1].volume_24h, 0.0);
    }

    #[test]
    fn url_covers_only_mappable_symbols() {
        let symbols = vec!["BTC".to_string(), "NOTACOIN".to_string(), "ETH".to_string()];
        let url = provider().build_price_url(&symbols).unwrap();
        assert!(url.contains("ids=bitcoin,ethereum"));
        assert!(url.contains("include_24hr_change=true"));
    }

    #[test]
    fn no_mappable_symbols_yields_no_url() {
        let symbols = vec!["NOTACOIN".to_string()];
        assert!(provider().build_price_url(&symbols).is_none());
    }
}
