//! Constants for the market data client
//!
//! All configuration for the client is centralized here. No runtime
//! configuration file is used - the system operates with these compile-time
//! constants, plus the `MARKET_DATA_PROXY_URL` environment variable for the
//! optional local proxy tier.

/// How long a cached quote is considered fresh (in milliseconds)
pub const QUOTE_TTL_MS: i64 = 10 * 60 * 1000;

/// HTTP request timeout when fetching prices (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 8;

/// Symbols fetched when the caller does not specify any
pub const DEFAULT_SYMBOLS: &[&str] = &["BTC", "ETH", "SOL"];

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko endpoint for batch simple price queries
pub const COINGECKO_SIMPLE_PRICE_ENDPOINT: &str = "/simple/price";

/// CoinGecko endpoint for global market statistics
pub const COINGECKO_GLOBAL_ENDPOINT: &str = "/global";

/// CoinCap API base URL
pub const COINCAP_API_URL: &str = "https://api.coincap.io/v2";

/// CoinCap endpoint listing every asset
pub const COINCAP_ASSETS_ENDPOINT: &str = "/assets";

/// Binance API base URL
pub const BINANCE_API_URL: &str = "https://api.binance.com/api/v3";

/// Binance 24h ticker endpoint (one call per symbol)
pub const BINANCE_TICKER_ENDPOINT: &str = "/ticker/24hr";

/// Quote currency suffix appended to symbols for Binance pairs
pub const BINANCE_QUOTE_SUFFIX: &str = "USDT";

/// Path of the local proxy's read endpoint
pub const PROXY_CRYPTO_ENDPOINT: &str = "/api/crypto";

/// Environment variable naming the local proxy base URL
pub const PROXY_URL_ENV: &str = "MARKET_DATA_PROXY_URL";

/// User agent for HTTP requests
pub const USER_AGENT: &str = "market-data-sdk/0.1.0";

/// Fallback market overview: total market cap in USD
pub const FALLBACK_TOTAL_MARKET_CAP: f64 = 2_500_000_000_000.0;

/// Fallback market overview: 24h total volume in USD
pub const FALLBACK_TOTAL_VOLUME_24H: f64 = 85_000_000_000.0;

/// Fallback market overview: BTC dominance percentage
pub const FALLBACK_BTC_DOMINANCE: f64 = 50.0;

/// Fallback market overview: neutral fear & greed index
pub const FALLBACK_FEAR_GREED_INDEX: f64 = 65.0;
