//! Market data client with provider failover and quote caching

use crate::{
    constants::{DEFAULT_SYMBOLS, PROXY_URL_ENV},
    error::ProviderError,
    metrics::{MetricsCollector, ProviderMetrics},
    provider::{OverviewSource, PriceProvider},
    providers::{BinanceProvider, CoinCapProvider, CoinGeckoProvider},
    proxy::LocalProxy,
    store::QuoteStore,
    symbols,
    types::{MarketOverview, PriceQuote, PriceResponse},
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Multi-provider market data client
///
/// Owns an ordered list of provider adapters, a rotating current-provider
/// index used for failover, and a TTL-bounded quote store. Construct one
/// instance per process and share it; there is no module-level global.
///
/// # Example
/// ```no_run
/// use market_data_sdk::MarketDataClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MarketDataClient::new()?;
/// let response = client.get_prices(&["BTC", "ETH"]).await;
/// for quote in &response.data {
///     println!("{}: ${:.2}", quote.symbol, quote.price);
/// }
/// # Ok(())
/// # }
/// ```
pub struct MarketDataClient {
    providers: Vec<Arc<dyn PriceProvider>>,
    metrics: Vec<Arc<MetricsCollector>>,
    overview: Arc<dyn OverviewSource>,
    store: QuoteStore,
    rotation: AtomicUsize,
    proxy: Option<LocalProxy>,
}

impl MarketDataClient {
    /// Creates a client with the default provider rotation:
    /// CoinGecko, then CoinCap, then Binance. CoinGecko doubles as the
    /// market overview source.
    pub fn new() -> Result<Self, ProviderError> {
        let coingecko = Arc::new(CoinGeckoProvider::new()?);

        Ok(Self::with_providers(
            vec![
                coingecko.clone(),
                Arc::new(CoinCapProvider::new()?),
                Arc::new(BinanceProvider::new()?),
            ],
            coingecko,
        ))
    }

    /// Like [`Self::new`], additionally wiring the local proxy tier from the
    /// `MARKET_DATA_PROXY_URL` environment variable when it is set
    pub fn from_env() -> Result<Self, ProviderError> {
        let client = Self::new()?;
        match std::env::var(PROXY_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => client.with_proxy(url),
            _ => Ok(client),
        }
    }

    /// Creates a client from explicit providers and overview source
    ///
    /// This is primarily for testing with mock providers.
    pub fn with_providers(
        providers: Vec<Arc<dyn PriceProvider>>,
        overview: Arc<dyn OverviewSource>,
    ) -> Self {
        let metrics = providers
            .iter()
            .map(|provider| Arc::new(MetricsCollector::new(provider.provider_name())))
            .collect();

        Self {
            providers,
            metrics,
            overview,
            store: QuoteStore::new(),
            rotation: AtomicUsize::new(0),
            proxy: None,
        }
    }

    /// Configures the local proxy tier, tried before any direct external call
    pub fn with_proxy(mut self, base_url: impl Into<String>) -> Result<Self, ProviderError> {
        self.proxy = Some(LocalProxy::new(base_url)?);
        Ok(self)
    }

    /// Fetches quotes for the requested symbols
    ///
    /// Fresh cache entries are served without any network call; stale or
    /// missing symbols go through the proxy tier (when configured) and then
    /// the provider rotation. The first provider success ends the attempt
    /// loop even when it covered only a subset of the stale symbols. When
    /// every tier fails, the response degrades to whatever cached data
    /// exists instead of erroring.
    pub async fn get_prices(&self, symbols: &[&str]) -> PriceResponse {
        let requested = symbols::normalize_symbols(symbols);
        if requested.is_empty() {
            return PriceResponse::ok(Vec::new());
        }

        let (fresh, stale) = self.store.partition(&requested).await;
        if stale.is_empty() {
            tracing::debug!(count = fresh.len(), "all requested symbols served from cache");
            return PriceResponse::ok(fresh);
        }

        if let Some(proxy) = &self.proxy {
            match proxy.fetch_prices(&stale).await {
                Ok(quotes) => {
                    let quotes = retain_requested(quotes, &stale);
                    if !quotes.is_empty() {
                        self.store.insert_many(quotes.clone()).await;
                        return PriceResponse::ok(merge(fresh, quotes));
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "local proxy unavailable, trying direct providers");
                }
            }
        }

        self.fetch_with_rotation(fresh, stale).await
    }

    /// Convenience fetch for the default symbol set
    pub async fn get_default_prices(&self) -> PriceResponse {
        self.get_prices(DEFAULT_SYMBOLS).await
    }

    /// Bounded attempt loop over the provider rotation
    async fn fetch_with_rotation(
        &self,
        fresh: Vec<PriceQuote>,
        stale: Vec<String>,
    ) -> PriceResponse {
        let attempts = self.providers.len();
        let mut index = self.rotation.load(Ordering::Relaxed) % attempts.max(1);

        for _ in 0..attempts {
            let provider = &self.providers[index];
            let start = Instant::now();

            let outcome = provider
                .fetch_prices(&stale)
                .await
                .map(|quotes| retain_requested(quotes, &stale));

            match outcome {
                Ok(quotes) if !quotes.is_empty() => {
                    self.metrics[index].record_request(start.elapsed(), true).await;
                    // leave the rotation pointing at the provider that worked
                    self.rotation.store(index, Ordering::Relaxed);
                    tracing::debug!(
                        provider = provider.provider_name(),
                        count = quotes.len(),
                        latency_ms = start.elapsed().as_millis() as u64,
                        "fetched prices"
                    );
                    self.store.insert_many(quotes.clone()).await;
                    return PriceResponse::ok(merge(fresh, quotes));
                }
                Ok(_) => {
                    self.metrics[index].record_request(start.elapsed(), false).await;
                    tracing::warn!(
                        provider = provider.provider_name(),
                        "provider returned no usable quotes, rotating"
                    );
                }
                Err(e) => {
                    self.metrics[index].record_request(start.elapsed(), false).await;
                    tracing::warn!(
                        provider = provider.provider_name(),
                        error = %e,
                        "provider failed, rotating"
                    );
                }
            }

            index = (index + 1) % attempts;
            self.rotation.store(index, Ordering::Relaxed);
        }

        tracing::warn!(
            cached = fresh.len(),
            missing = stale.len(),
            "all providers exhausted, serving cached data only"
        );
        PriceResponse::degraded(fresh, "all providers exhausted")
    }

    /// Fetches the aggregate market overview
    ///
    /// Two-tier fallback without cache or rotation state: the proxy (when
    /// configured), then the overview source, then the fixed fallback
    /// snapshot. Never errors.
    pub async fn get_market_overview(&self) -> MarketOverview {
        if let Some(proxy) = &self.proxy {
            match proxy.fetch_overview().await {
                Ok(overview) => return overview,
                Err(e) => {
                    tracing::debug!(error = %e, "local proxy overview unavailable");
                }
            }
        }

        match self.overview.fetch_overview().await {
            Ok(overview) => overview,
            Err(e) => {
                tracing::warn!(error = %e, "overview fetch failed, serving fallback snapshot");
                MarketOverview::fallback()
            }
        }
    }

    /// Index of the provider the next rotation sequence starts from
    pub fn current_provider_index(&self) -> usize {
        self.rotation.load(Ordering::Relaxed)
    }

    /// Name of the provider the next rotation sequence starts from
    pub fn current_provider_name(&self) -> Option<&'static str> {
        self.providers
            .get(self.current_provider_index())
            .map(|provider| provider.provider_name())
    }

    /// Request metrics for every configured provider, in rotation order
    pub async fn provider_metrics(&self) -> Vec<ProviderMetrics> {
        let mut result = Vec::with_capacity(self.metrics.len());
        for collector in &self.metrics {
            result.push(collector.get_metrics().await);
        }
        result
    }
}

/// Drops quotes for symbols the caller never asked for
fn retain_requested(quotes: Vec<PriceQuote>, requested: &[String]) -> Vec<PriceQuote> {
    quotes
        .into_iter()
        .filter(|quote| requested.contains(&quote.symbol))
        .collect()
}

/// Cache hits and freshly fetched quotes; disjoint by construction since
/// fetched quotes are filtered to the stale set
fn merge(fresh: Vec<PriceQuote>, fetched: Vec<PriceQuote>) -> Vec<PriceQuote> {
    let mut merged = fresh;
    merged.extend(fetched);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::{MockOverview, MockProvider};

    fn client_from(
        mocks: &[Arc<MockProvider>],
        overview: Option<MarketOverview>,
    ) -> MarketDataClient {
        let providers = mocks
            .iter()
            .map(|mock| mock.clone() as Arc<dyn PriceProvider>)
            .collect();
        MarketDataClient::with_providers(providers, Arc::new(MockOverview::new(overview)))
    }

    #[tokio::test]
    async fn returns_only_requested_symbols() {
        let provider = Arc::new(MockProvider::new("primary"));
        provider.set_price("BTC", 45000.0);
        provider.set_price("ETH", 2800.0);
        let client = client_from(&[provider.clone()], None);

        let response = client.get_prices(&["BTC", "ETH", "SOL"]).await;

        assert!(response.success);
        assert!(!response.degraded);
        assert_eq!(response.data.len(), 2);
        assert!(response.data.iter().all(|q| q.price >= 0.0));
        assert!(response.data.iter().all(|q| q.symbol == "BTC" || q.symbol == "ETH"));
        assert!(response.data.iter().all(|q| q.symbol != "SOL"));
    }

    #[tokio::test]
    async fn second_call_within_ttl_is_served_from_cache() {
        let provider = Arc::new(MockProvider::new("primary"));
        provider.set_price("BTC", 45000.0);
        let client = client_from(&[provider.clone()], None);

        let first = client.get_prices(&["BTC"]).await;
        let second = client.get_prices(&["BTC"]).await;

        assert_eq!(provider.call_count(), 1);
        assert_eq!(first.data.len(), 1);
        assert_eq!(second.data.len(), 1);
        assert_eq!(second.data[0].price, 45000.0);
    }

    #[tokio::test]
    async fn failover_reaches_the_third_provider() {
        let first = Arc::new(MockProvider::new("first"));
        let second = Arc::new(MockProvider::new("second"));
        let third = Arc::new(MockProvider::new("third"));
        first.set_failing(true);
        second.set_failing(true);
        third.set_price("BTC", 46000.0);
        let client = client_from(&[first.clone(), second.clone(), third.clone()], None);

        let response = client.get_prices(&["BTC"]).await;

        assert!(response.success);
        assert!(!response.degraded);
        assert_eq!(response.data.len(), 1);
        assert_eq!(response.data[0].price, 46000.0);
        assert_eq!(first.call_count(), 1);
        assert_eq!(second.call_count(), 1);
        assert_eq!(third.call_count(), 1);
        assert_eq!(client.current_provider_index(), 2);
        assert_eq!(client.current_provider_name(), Some("third"));

        let metrics = client.provider_metrics().await;
        assert_eq!(metrics[0].failed_requests, 1);
        assert_eq!(metrics[1].failed_requests, 1);
        assert_eq!(metrics[2].failed_requests, 0);
        assert_eq!(metrics[2].total_requests, 1);
    }

    #[tokio::test]
    async fn rotation_persists_across_calls() {
        let first = Arc::new(MockProvider::new("first"));
        let second = Arc::new(MockProvider::new("second"));
        first.set_failing(true);
        second.set_price("BTC", 45000.0);
        second.set_price("ETH", 2800.0);
        let client = client_from(&[first.clone(), second.clone()], None);

        client.get_prices(&["BTC"]).await;
        assert_eq!(client.current_provider_index(), 1);

        // the next call starts at the provider that last worked
        client.get_prices(&["ETH"]).await;
        assert_eq!(first.call_count(), 1);
        assert_eq!(second.call_count(), 2);
    }

    #[tokio::test]
    async fn total_failure_with_empty_cache_degrades_without_erroring() {
        let first = Arc::new(MockProvider::new("first"));
        let second = Arc::new(MockProvider::new("second"));
        first.set_failing(true);
        second.set_failing(true);
        let client = client_from(&[first.clone(), second.clone()], None);

        let response = client.get_prices(&["BTC", "ETH"]).await;

        assert!(response.success);
        assert!(response.degraded);
        assert!(response.data.is_empty());
        assert!(response.error.is_some());
        assert_eq!(first.call_count(), 1);
        assert_eq!(second.call_count(), 1);
    }

    #[tokio::test]
    async fn degraded_response_carries_the_cached_subset() {
        let provider = Arc::new(MockProvider::new("primary"));
        provider.set_price("BTC", 45000.0);
        let client = client_from(&[provider.clone()], None);

        client.get_prices(&["BTC"]).await;
        provider.set_failing(true);

        let response = client.get_prices(&["BTC", "ETH"]).await;

        assert!(response.degraded);
        assert_eq!(response.data.len(), 1);
        assert_eq!(response.data[0].symbol, "BTC");
    }

    #[tokio::test]
    async fn empty_symbol_list_makes_no_network_call() {
        let provider = Arc::new(MockProvider::new("primary"));
        let client = client_from(&[provider.clone()], None);

        let response = client.get_prices(&[]).await;

        assert!(response.success);
        assert!(response.data.is_empty());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn duplicate_and_lowercase_symbols_collapse() {
        let provider = Arc::new(MockProvider::new("primary"));
        provider.set_price("BTC", 45000.0);
        let client = client_from(&[provider.clone()], None);

        let response = client.get_prices(&["btc", "BTC", " btc "]).await;

        assert_eq!(response.data.len(), 1);
        assert_eq!(response.data[0].symbol, "BTC");
    }

    #[tokio::test]
    async fn overview_uses_the_source_when_it_succeeds() {
        let provider = Arc::new(MockProvider::new("primary"));
        let custom = MarketOverview {
            total_market_cap: 3_000_000_000_000.0,
            total_volume_24h: 90_000_000_000.0,
            btc_dominance: 52.5,
            fear_greed_index: 40.0,
        };
        let client = client_from(&[provider], Some(custom.clone()));

        assert_eq!(client.get_market_overview().await, custom);
    }

    #[tokio::test]
    async fn overview_falls_back_to_fixed_snapshot() {
        let provider = Arc::new(MockProvider::new("primary"));
        let client = client_from(&[provider], None);

        let overview = client.get_market_overview().await;

        assert_eq!(overview, MarketOverview::fallback());
        assert_eq!(overview.total_market_cap, 2_500_000_000_000.0);
        assert_eq!(overview.total_volume_24h, 85_000_000_000.0);
        assert_eq!(overview.btc_dominance, 50.0);
        assert_eq!(overview.fear_greed_index, 65.0);
    }

    #[tokio::test]
    async fn default_symbol_fetch_covers_the_ticker_trio() {
        let provider = Arc::new(MockProvider::new("primary"));
        provider.set_price("BTC", 45000.0);
        provider.set_price("ETH", 2800.0);
        provider.set_price("SOL", 150.0);
        let client = client_from(&[provider], None);

        let response = client.get_default_prices().await;
        assert_eq!(response.data.len(), 3);
    }
}
