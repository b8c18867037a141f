//! Symbol normalization and provider identifier mapping

/// Ticker to CoinGecko asset id, for every symbol the client knows how to
/// route to CoinGecko. Symbols absent from this table are silently skipped
/// by the CoinGecko adapter (other providers may still cover them).
const COINGECKO_IDS: &[(&str, &str)] = &[
    ("BTC", "bitcoin"),
    ("ETH", "ethereum"),
    ("SOL", "solana"),
    ("BNB", "binancecoin"),
    ("ADA", "cardano"),
    ("XRP", "ripple"),
    ("DOT", "polkadot"),
    ("DOGE", "dogecoin"),
    ("AVAX", "avalanche-2"),
    ("MATIC", "matic-network"),
    ("LINK", "chainlink"),
    ("UNI", "uniswap"),
    ("ATOM", "cosmos"),
    ("LTC", "litecoin"),
    ("BCH", "bitcoin-cash"),
    ("XLM", "stellar"),
    ("ALGO", "algorand"),
    ("VET", "vechain"),
    ("ICP", "internet-computer"),
    ("FIL", "filecoin"),
];

/// Looks up the CoinGecko id for a ticker (case-insensitive)
pub fn coingecko_id(symbol: &str) -> Option<&'static str> {
    COINGECKO_IDS
        .iter()
        .find(|(sym, _)| sym.eq_ignore_ascii_case(symbol))
        .map(|(_, id)| *id)
}

/// Looks up the canonical ticker for a CoinGecko id
pub fn symbol_for_coingecko_id(id: &str) -> Option<&'static str> {
    COINGECKO_IDS
        .iter()
        .find(|(_, cg_id)| *cg_id == id)
        .map(|(sym, _)| *sym)
}

/// Canonicalizes a caller-supplied symbol list: trims, uppercases, drops
/// empties, and dedupes while preserving first-seen order
pub fn normalize_symbols(symbols: &[&str]) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let canonical = symbol.trim().to_ascii_uppercase();
        if !canonical.is_empty() && !result.contains(&canonical) {
            result.push(canonical);
        }
    }
    result
}
