//! Market data provider implementations

pub mod binance;
pub mod coincap;
pub mod coingecko;

pub use binance::BinanceProvider;
pub use coincap::CoinCapProvider;
pub use coingecko::CoinGeckoProvider;
