use async_trait::async_trait;

use interface::{ExchangeError, ExchangeId, PriceObservation};

pub mod binance;
pub mod bitfinex;
pub mod coinbase;

/// Symbols tracked by default, in normalized "BASE/USD" form.
pub const DEFAULT_SYMBOLS: [&str; 5] = ["BTC/USD", "ETH/USD", "SOL/USD", "BNB/USD", "XRP/USD"];

#[async_trait]
pub trait TickerExchange: Send + Sync {
    fn id(&self) -> ExchangeId;

    /// Fetch one observation per tracked symbol. Any leg failing fails the
    /// whole batch, so the collector drops this exchange for the cycle.
    async fn fetch_tickers(&self) -> Result<Vec<PriceObservation>, ExchangeError>;
}

/// Base asset of a normalized symbol: "BTC/USD" -> "BTC".
pub(crate) fn base_asset(symbol: &str) -> &str {
    symbol.split('/').next().unwrap_or(symbol)
}

// Convenience re-exports
pub use binance::BinanceClient;
pub use bitfinex::BitfinexClient;
pub use coinbase::CoinbaseClient;
