use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExchangeId {
    // Variants are declared alphabetically: the derived Ord is the
    // lexicographic exchange-name order used for pair iteration.
    Binance,
    Bitfinex,
    Coinbase,
}

impl ExchangeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeId::Binance => "Binance",
            ExchangeId::Bitfinex => "Bitfinex",
            ExchangeId::Coinbase => "Coinbase",
        }
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One price reading for a (exchange, symbol) pair. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub exchange: ExchangeId,
    /// Normalized pair identifier, e.g. "BTC/USD".
    pub symbol: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

/// Append-only table of observations, insertion order preserved.
/// Never pruned: memory grows with run length.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceTable {
    observations: Vec<PriceObservation>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, batch: Vec<PriceObservation>) {
        self.observations.extend(batch);
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    pub fn into_observations(self) -> Vec<PriceObservation> {
        self.observations
    }

    /// Distinct symbols seen so far, in sorted order.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.observations.iter().map(|o| o.symbol.clone()).collect();
        symbols.sort();
        symbols.dedup();
        symbols
    }
}

/// Largest pairwise spread for one symbol. Derived, never persisted.
/// The buy leg is the cheaper exchange, so spread_percent >= 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadResult {
    pub symbol: String,
    pub buy_exchange: ExchangeId,
    pub sell_exchange: ExchangeId,
    pub buy_price: f64,
    pub sell_price: f64,
    pub spread_percent: f64,
}

/// One executed pseudo-trade in the simulator ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub symbol: String,
    pub buy_exchange: ExchangeId,
    pub sell_exchange: ExchangeId,
    pub buy_price: f64,
    pub sell_price: f64,
    pub spread_percent: f64,
    pub fee_percent: f64,
    pub quantity: f64,
    pub net_profit: f64,
    pub executed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(exchange: ExchangeId, symbol: &str, price: f64) -> PriceObservation {
        PriceObservation {
            exchange,
            symbol: symbol.to_string(),
            price,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn exchange_ids_order_lexicographically() {
        assert!(ExchangeId::Binance < ExchangeId::Bitfinex);
        assert!(ExchangeId::Bitfinex < ExchangeId::Coinbase);
        assert_eq!(ExchangeId::Bitfinex.as_str(), "Bitfinex");
    }

    #[test]
    fn table_grows_by_batch_size() {
        // N cycles x E exchanges x S symbols rows, nothing evicted
        let mut table = PriceTable::new();
        for _ in 0..3 {
            let mut batch = Vec::new();
            for ex in [ExchangeId::Binance, ExchangeId::Coinbase] {
                for sym in ["BTC/USD", "ETH/USD"] {
                    batch.push(obs(ex, sym, 100.0));
                }
            }
            table.append(batch);
        }
        assert_eq!(table.len(), 3 * 2 * 2);
    }

    #[test]
    fn symbols_are_distinct_and_sorted() {
        let mut table = PriceTable::new();
        table.append(vec![
            obs(ExchangeId::Binance, "ETH/USD", 3000.0),
            obs(ExchangeId::Coinbase, "BTC/USD", 100_000.0),
            obs(ExchangeId::Binance, "BTC/USD", 100_100.0),
        ]);
        assert_eq!(table.symbols(), vec!["BTC/USD", "ETH/USD"]);
    }
}
