//! In-memory quote store with lazy expiry

use crate::{constants::QUOTE_TTL_MS, types::PriceQuote};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory store for price quotes, keyed by canonical symbol
///
/// Entries are never evicted; freshness is computed at read time and a stale
/// entry simply behaves like a miss until overwritten. The symbol universe
/// is tens of entries, so the map stays small for the process lifetime.
/// Concurrent writes are last-writer-wins, which is acceptable for
/// idempotent snapshots.
pub struct QuoteStore {
    quotes: RwLock<HashMap<String, PriceQuote>>,
}

impl QuoteStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            quotes: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts or overwrites the quote for its symbol
    pub async fn insert(&self, quote: PriceQuote) {
        let mut quotes = self.quotes.write().await;
        tracing::debug!(symbol = %quote.symbol, price = quote.price, "updated cached quote");
        quotes.insert(quote.symbol.clone(), quote);
    }

    /// Inserts a batch of quotes
    pub async fn insert_many(&self, batch: Vec<PriceQuote>) {
        let mut quotes = self.quotes.write().await;
        for quote in batch {
            quotes.insert(quote.symbol.clone(), quote);
        }
    }

    /// Returns the quote for `symbol` if it exists and is still fresh
    pub async fn get_fresh(&self, symbol: &str) -> Option<PriceQuote> {
        let quotes = self.quotes.read().await;
        let now_ms = Utc::now().timestamp_millis();
        quotes
            .get(symbol)
            .filter(|quote| quote.age_ms(now_ms) < QUOTE_TTL_MS)
            .cloned()
    }

    /// True iff an entry exists for `symbol` and is within the TTL
    pub async fn is_fresh(&self, symbol: &str) -> bool {
        self.get_fresh(symbol).await.is_some()
    }

    /// Splits the requested symbols into quotes served from cache and the
    /// symbols that need a network fetch
    pub async fn partition(&self, symbols: &[String]) -> (Vec<PriceQuote>, Vec<String>) {
        let quotes = self.quotes.read().await;
        let now_ms = Utc::now().timestamp_millis();

        let mut fresh = Vec::new();
        let mut stale = Vec::new();
        for symbol in symbols {
            match quotes
                .get(symbol)
                .filter(|quote| quote.age_ms(now_ms) < QUOTE_TTL_MS)
            {
                Some(quote) => fresh.push(quote.clone()),
                None => stale.push(symbol.clone()),
            }
        }
        (fresh, stale)
    }

    /// Number of entries in the map, fresh or not
    pub async fn len(&self) -> usize {
        self.quotes.read().await.len()
    }

    /// True when the store holds no entries at all
    pub async fn is_empty(&self) -> bool {
        self.quotes.read().await.is_empty()
    }
}

impl Default for QuoteStore {
    fn default() -> Self {
        Self::new()
    }
}
