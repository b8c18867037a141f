//! Local proxy tier
//!
//! When the client runs behind a same-process server route that re-exposes
//! prices and the market overview under a `{symbols, type}`-parameterized
//! read endpoint, that route is tried before any direct external call. A
//! failing or unreachable proxy falls through to the provider rotation.

use crate::{
    constants::{PROXY_CRYPTO_ENDPOINT, REQUEST_TIMEOUT_SECS, USER_AGENT},
    error::ProviderError,
    types::{MarketOverview, PriceQuote, PriceResponse},
};
use reqwest::Client;
use std::time::Duration;

/// Client for the local proxy's read endpoint
pub struct LocalProxy {
    client: Client,
    base_url: String,
}

impl LocalProxy {
    /// Creates a proxy client for `base_url` (scheme + host, no path)
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProviderError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetches quotes through the proxy
    ///
    /// The proxy answers with the same envelope this crate produces; a
    /// `success=false` envelope counts as a proxy failure so the caller
    /// falls through to direct provider calls.
    pub async fn fetch_prices(&self, symbols: &[String]) -> Result<Vec<PriceQuote>, ProviderError> {
        let url = format!(
            "{}{}?symbols={}&type=prices",
            self.base_url,
            PROXY_CRYPTO_ENDPOINT,
            symbols.join(",")
        );
        tracing::debug!(url = %url, "fetching prices from local proxy");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ProviderError::from_request)?;

        if !response.status().is_success() {
            return Err(ProviderError::api_error(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body = response.text().await.map_err(ProviderError::Network)?;
        let envelope: PriceResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse proxy envelope: {}", e))
        })?;

        if !envelope.success {
            return Err(ProviderError::api_error(
                envelope
                    .error
                    .unwrap_or_else(|| "proxy returned failure envelope".to_string()),
            ));
        }
        if envelope.data.is_empty() {
            return Err(ProviderError::invalid_response("proxy returned no quotes"));
        }

        Ok(envelope.data)
    }

    /// Fetches the market overview through the proxy
    pub async fn fetch_overview(&self) -> Result<MarketOverview, ProviderError> {
        let url = format!("{}{}?type=overview", self.base_url, PROXY_CRYPTO_ENDPOINT);
        tracing::debug!(url = %url, "fetching market overview from local proxy");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ProviderError::from_request)?;

        if !response.status().is_success() {
            return Err(ProviderError::api_error(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body = response.text().await.map_err(ProviderError::Network)?;
        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse proxy overview: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let proxy = LocalProxy::new("http://localhost:3000/").unwrap();
        assert_eq!(proxy.base_url, "http://localhost:3000");
    }
}
