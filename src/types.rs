//! Types for the market data client

use crate::constants::{
    FALLBACK_BTC_DOMINANCE, FALLBACK_FEAR_GREED_INDEX, FALLBACK_TOTAL_MARKET_CAP,
    FALLBACK_TOTAL_VOLUME_24H,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One asset's market snapshot
///
/// Serialized in camelCase so it interoperates with the local proxy's wire
/// format (`{"symbol": "BTC", "price": ..., "change24h": ..., ...}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    /// Canonical uppercase ticker, e.g. "BTC"
    pub symbol: String,

    /// Price in USD
    pub price: f64,

    /// 24h price change percentage, 0 when the provider lacks the field
    #[serde(default)]
    pub change_24h: f64,

    /// Market capitalization in USD, 0 when unsupplied
    #[serde(default)]
    pub market_cap: f64,

    /// 24h trading volume in USD, 0 when unsupplied
    #[serde(default)]
    pub volume_24h: f64,

    /// When this quote was fetched (ms since epoch), not when the market moved
    pub last_updated: i64,
}

impl PriceQuote {
    /// Creates a quote stamped with the current time
    pub fn new(symbol: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            change_24h: 0.0,
            market_cap: 0.0,
            volume_24h: 0.0,
            last_updated: Utc::now().timestamp_millis(),
        }
    }

    /// Age of the quote in milliseconds relative to `now_ms`
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.last_updated
    }
}

/// Caller-facing envelope returned by [`crate::MarketDataClient::get_prices`]
///
/// Always structurally valid: total provider failure degrades to cached data
/// plus the `degraded` flag instead of an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    /// Whether the request produced a usable response
    pub success: bool,

    /// Quotes for the requested symbols (covered subset only)
    #[serde(default)]
    pub data: Vec<PriceQuote>,

    /// Human-readable reason when data is degraded or missing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// True when fresh data could not be obtained and cached values were
    /// substituted
    #[serde(default)]
    pub degraded: bool,
}

impl PriceResponse {
    /// Creates a successful response
    pub fn ok(data: Vec<PriceQuote>) -> Self {
        Self {
            success: true,
            data,
            error: None,
            degraded: false,
        }
    }

    /// Creates a degraded response carrying whatever cached data survived
    pub fn degraded(data: Vec<PriceQuote>, error: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            error: Some(error.into()),
            degraded: true,
        }
    }
}

/// Aggregate market snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOverview {
    /// Total market capitalization in USD
    pub total_market_cap: f64,

    /// 24h total volume in USD
    pub total_volume_24h: f64,

    /// Dominant-asset (BTC) share percentage
    pub btc_dominance: f64,

    /// Sentiment index, 0-100
    pub fear_greed_index: f64,
}

impl MarketOverview {
    /// The hardcoded snapshot served when every overview tier fails
    pub fn fallback() -> Self {
        Self {
            total_market_cap: FALLBACK_TOTAL_MARKET_CAP,
            total_volume_24h: FALLBACK_TOTAL_VOLUME_24H,
            btc_dominance: FALLBACK_BTC_DOMINANCE,
            fear_greed_index: FALLBACK_FEAR_GREED_INDEX,
        }
    }
}
