use chrono::{DateTime, Utc};
use serde::Serialize;

use interface::Trade;

/// Unbounded ledger of executed pseudo-trades plus the running total.
/// Owned exclusively by the simulator task; readers get a `LedgerView`.
#[derive(Debug, Default)]
pub struct Ledger {
    trades: Vec<Trade>,
    total_gain: f64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, trade: Trade) {
        self.total_gain += trade.net_profit;
        self.trades.push(trade);
    }

    pub fn total_gain(&self) -> f64 {
        self.total_gain
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn last_executed_at(&self) -> Option<DateTime<Utc>> {
        self.trades.last().map(|t| t.executed_at)
    }

    /// Cloneable snapshot published to the HTTP server.
    pub fn view(&self) -> LedgerView {
        LedgerView {
            total_gain: self.total_gain,
            trade_count: self.trades.len(),
            last_executed_at: self.last_executed_at(),
            trades: self.trades.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LedgerView {
    pub total_gain: f64,
    pub trade_count: usize,
    pub last_executed_at: Option<DateTime<Utc>>,
    pub trades: Vec<Trade>,
}
