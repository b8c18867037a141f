//! CoinCap provider implementation

use crate::{
    constants::{COINCAP_API_URL, COINCAP_ASSETS_ENDPOINT, REQUEST_TIMEOUT_SECS, USER_AGENT},
    error::ProviderError,
    provider::PriceProvider,
    types::PriceQuote,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// CoinCap /assets response: the full asset list, numeric fields as strings
#[derive(Debug, Deserialize)]
struct AssetsResponse {
    #[serde(default)]
    data: Vec<AssetEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetEntry {
    symbol: String,
    price_usd: Option<String>,
    change_percent24_hr: Option<String>,
    market_cap_usd: Option<String>,
    volume_usd24_hr: Option<String>,
}

/// CoinCap has no batch-by-symbol endpoint, so the adapter fetches the
/// entire asset list once and filters client-side by ticker.
pub struct CoinCapProvider {
    client: Client,
}

impl CoinCapProvider {
    /// Creates a new CoinCap provider
    pub fn new() -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProviderError::Network)?;

        Ok(Self { client })
    }

    /// Filters the asset list to the requested symbols (case-insensitive)
    /// and converts the string-typed numeric fields, defaulting to 0
    fn filter_assets(&self, response: AssetsResponse, symbols: &[String]) -> Vec<PriceQuote> {
        let mut result = Vec::with_capacity(symbols.len());

        for asset in response.data {
            let matched = symbols
                .iter()
                .any(|symbol| symbol.eq_ignore_ascii_case(&asset.symbol));
            if !matched {
                continue;
            }

            let mut quote = PriceQuote::new(
                asset.symbol.to_ascii_uppercase(),
                parse_decimal(asset.price_usd),
            );
            quote.change_24h = parse_decimal(asset.change_percent24_hr);
            quote.market_cap = parse_decimal(asset.market_cap_usd);
            quote.volume_24h = parse_decimal(asset.volume_usd24_hr);
            result.push(quote);
        }

        result
    }
}

fn parse_decimal(value: Option<String>) -> f64 {
    value
        .and_then(|raw| raw.parse::<f64>().ok())
        .unwrap_or_default()
}

impl Default for CoinCapProvider {
    fn default() -> Self {
        Self::new().expect("Failed to create CoinCap provider")
    }
}

#[async_trait]
impl PriceProvider for CoinCapProvider {
    async fn fetch_prices(&self, symbols: &[String]) -> Result<Vec<PriceQuote>, ProviderError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}{}", COINCAP_API_URL, COINCAP_ASSETS_ENDPOINT);
        tracing::debug!(url = %url, "fetching asset list from CoinCap");

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
        let parsed: AssetsResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse CoinCap response: {}", e))
        })?;

        let quotes = self.filter_assets(parsed, symbols);
        if quotes.is_empty() {
            return Err(ProviderError::invalid_response(
                "no requested symbols in CoinCap asset list",
            ));
        }

        tracing::debug!(count = quotes.len(), "fetched prices from CoinCap");
        Ok(quotes)
    }

    fn provider_name(&self) -> &'static str {
        "coincap"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_asset_list_case_insensitively() {
        let body = serde_json::json!({
            "data": [
                {
                    "symbol": "btc",
                    "priceUsd": "45000.5",
                    "changePercent24Hr": "-1.25",
                    "marketCapUsd": "880000000000",
                    "volumeUsd24Hr": "21000000000"
                },
                { "symbol": "ETH", "priceUsd": "2800.0" },
                { "symbol": "XYZ", "priceUsd": "0.01" }
            ]
        });
        let parsed: AssetsResponse = serde_json::from_value(body).unwrap();
        let provider = CoinCapProvider::new().unwrap();

        let symbols = vec!["BTC".to_string(), "ETH".to_string()];
        let mut quotes = provider.filter_assets(parsed, &symbols);
        quotes.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].symbol, "BTC");
        assert_eq!(quotes[0].price, 45000.5);
        assert_eq!(quotes[0].change_24h, -1.25);
        assert_eq!(quotes[1].symbol, "ETH");
        assert_eq!(quotes[1].market_cap, 0.0);
    }

    #[test]
    fn unparsable_numbers_default_to_zero() {
        assert_eq!(parse_decimal(Some("not a number".to_string())), 0.0);
        assert_eq!(parse_decimal(None), 0.0);
        assert_eq!(parse_decimal(Some("12.5".to_string())), 12.5);
    }
}
