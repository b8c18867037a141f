//! # Market Data SDK
//!
//! Multi-provider cryptocurrency market data client: queries several public
//! market-data APIs (CoinGecko, CoinCap, Binance), normalizes their
//! disparate response shapes into one [`PriceQuote`] model, rotates across
//! providers on failure, and caches results to avoid rate-limit exhaustion.
//!
//! ## Usage
//!
//! Construct one [`MarketDataClient`] per process and share it:
//!
//! ```no_run
//! use market_data_sdk::MarketDataClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MarketDataClient::new()?;
//!
//! // Quotes, served from cache when fresh
//! let response = client.get_prices(&["BTC", "ETH", "SOL"]).await;
//! for quote in &response.data {
//!     println!("{}: ${:.2} ({:+.2}% 24h)", quote.symbol, quote.price, quote.change_24h);
//! }
//!
//! // Aggregate market statistics, with a fixed fallback on total failure
//! let overview = client.get_market_overview().await;
//! println!("Total market cap: ${:.0}", overview.total_market_cap);
//! # Ok(())
//! # }
//! ```
//!
//! Calls never error out of the public surface: provider failures rotate to
//! the next adapter, and total exhaustion degrades to cached or default data
//! with the `degraded` flag set on the response envelope.

pub mod client;
pub mod constants;
pub mod error;
pub mod metrics;
pub mod provider;
pub mod providers;
pub mod proxy;
pub mod store;
pub mod symbols;
pub mod types;

// Re-export commonly used types
pub use client::MarketDataClient;
pub use error::ProviderError;
pub use metrics::ProviderMetrics;
pub use provider::{OverviewSource, PriceProvider};
pub use types::{MarketOverview, PriceQuote, PriceResponse};
