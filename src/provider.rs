//! Provider abstraction for fetching market data from external APIs

use crate::{
    error::ProviderError,
    types::{MarketOverview, PriceQuote},
};
use async_trait::async_trait;

/// Trait for price providers
///
/// Implementations fetch cryptocurrency quotes from one external source
/// (CoinGecko, CoinCap, Binance, ...) and normalize the provider-specific
/// response shape into [`PriceQuote`]. All provider-format assumptions live
/// behind this boundary.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetches quotes for the given canonical symbols
    ///
    /// Returns quotes only for symbols this provider could resolve; a
    /// partial result is valid. An empty result, a non-success HTTP status,
    /// or an unparsable body is an error so the caller can rotate to the
    /// next provider.
    async fn fetch_prices(&self, symbols: &[String]) -> Result<Vec<PriceQuote>, ProviderError>;

    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;
}

/// Trait for aggregate market overview sources
#[async_trait]
pub trait OverviewSource: Send + Sync {
    /// Fetches the global market overview snapshot
    async fn fetch_overview(&self) -> Result<MarketOverview, ProviderError>;
}
