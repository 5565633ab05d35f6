use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{info, warn};
use uuid::Uuid;

use exchanges::TickerExchange;
use interface::{spread, PriceTable, SpreadResult, Trade};

use super::gate::ExecutionGate;
use super::ledger::{Ledger, LedgerView};

/// Simulator tunables.
#[derive(Debug, Clone)]
pub struct SimulatorParams {
    /// Flat fee percentage charged on each leg
    pub fee_percent: f64,
    /// Minimum net spread (percent) worth executing
    pub min_spread_percent: f64,
    /// Seconds that must elapse between two executions
    pub cooldown_secs: u64,
    /// Notional per trade in USD; quantity = notional / buy price
    pub notional: f64,
    /// Seconds between evaluation ticks
    pub interval_secs: u64,
    /// Evaluate and log opportunities without recording trades
    pub dry_run: bool,
}

impl Default for SimulatorParams {
    fn default() -> Self {
        Self {
            fee_percent: 0.3,
            min_spread_percent: 0.5,
            cooldown_secs: 60,
            notional: 100.0,
            interval_secs: 5,
            dry_run: false,
        }
    }
}

/// The arbitrage simulator owns its table, gate and ledger exclusively;
/// the HTTP server observes the ledger through the watch channel.
pub struct ArbitrageSimulator {
    exchanges: Vec<Arc<dyn TickerExchange>>,
    params: SimulatorParams,
    table: PriceTable,
    gate: ExecutionGate,
    ledger: Ledger,
    ledger_tx: watch::Sender<LedgerView>,
}

impl ArbitrageSimulator {
    pub fn new(
        exchanges: Vec<Arc<dyn TickerExchange>>,
        params: SimulatorParams,
    ) -> (Self, watch::Receiver<LedgerView>) {
        let (ledger_tx, ledger_rx) = watch::channel(LedgerView::default());
        let gate = ExecutionGate::new(chrono::Duration::seconds(params.cooldown_secs as i64));

        (
            Self {
                exchanges,
                params,
                table: PriceTable::new(),
                gate,
                ledger: Ledger::new(),
                ledger_tx,
            },
            ledger_rx,
        )
    }

    /// Per-symbol max spreads whose net-of-fees spread clears the minimum.
    fn qualifying_opportunities(&self) -> Vec<SpreadResult> {
        spread::max_spreads(self.table.observations())
            .into_iter()
            .filter(|s| {
                spread::net_spread_percent(s.buy_price, s.sell_price, self.params.fee_percent)
                    >= self.params.min_spread_percent
            })
            .collect()
    }

    fn execute(&mut self, opportunity: &SpreadResult) -> Trade {
        let quantity = self.params.notional / opportunity.buy_price;
        let net_profit = spread::net_profit(
            opportunity.buy_price,
            opportunity.sell_price,
            self.params.fee_percent,
            quantity,
        );

        let trade = Trade {
            id: Uuid::new_v4(),
            symbol: opportunity.symbol.clone(),
            buy_exchange: opportunity.buy_exchange,
            sell_exchange: opportunity.sell_exchange,
            buy_price: opportunity.buy_price,
            sell_price: opportunity.sell_price,
            spread_percent: opportunity.spread_percent,
            fee_percent: self.params.fee_percent,
            quantity,
            net_profit,
            executed_at: Utc::now(),
        };

        self.ledger.record(trade.clone());
        // server may not be up yet; send failure only means no receiver
        let _ = self.ledger_tx.send(self.ledger.view());
        trade
    }

    /// One cycle: collect, append, evaluate, maybe execute.
    async fn tick(&mut self) {
        let mut batch = Vec::new();
        for ex in &self.exchanges {
            match ex.fetch_tickers().await {
                Ok(mut v) => batch.append(&mut v),
                Err(e) => {
                    warn!("ticker fetch error from {}: {:?}", ex.id(), e);
                }
            }
        }

        if batch.is_empty() {
            warn!("no observations this cycle");
            return;
        }
        self.table.append(batch);

        for opportunity in self.qualifying_opportunities() {
            let net = spread::net_spread_percent(
                opportunity.buy_price,
                opportunity.sell_price,
                self.params.fee_percent,
            );

            if self.params.dry_run {
                info!(
                    "DRY RUN: {} buy {} @ {:.2}, sell {} @ {:.2} ({:.4}% net)",
                    opportunity.symbol,
                    opportunity.buy_exchange,
                    opportunity.buy_price,
                    opportunity.sell_exchange,
                    opportunity.sell_price,
                    net
                );
                continue;
            }

            if self.gate.try_execute(Utc::now()) {
                let trade = self.execute(&opportunity);
                info!(
                    "executed {}: buy {} @ {:.2}, sell {} @ {:.2}, qty {:.6}, net profit {:.4} (total {:.4})",
                    trade.symbol,
                    trade.buy_exchange,
                    trade.buy_price,
                    trade.sell_exchange,
                    trade.sell_price,
                    trade.quantity,
                    trade.net_profit,
                    self.ledger.total_gain()
                );
            } else {
                info!(
                    "opportunity on {} held back by cooldown ({:.4}% net)",
                    opportunity.symbol, net
                );
            }
        }
    }

    /// Main simulator loop. Polls, evaluates and executes forever; fetch
    /// failures only cost the affected exchange its batch for the cycle.
    pub async fn run_loop(mut self) {
        info!("starting arbitrage simulator");
        info!("  Fee: {}% per leg", self.params.fee_percent);
        info!("  Min net spread: {}%", self.params.min_spread_percent);
        info!("  Cooldown: {}s", self.params.cooldown_secs);
        info!("  Notional: {} USD", self.params.notional);
        info!("  Interval: {}s", self.params.interval_secs);
        info!("  Dry run: {}", self.params.dry_run);

        let interval = std::time::Duration::from_secs(self.params.interval_secs);
        loop {
            self.tick().await;
            sleep(interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use interface::{ExchangeError, ExchangeId, PriceObservation};

    struct FixedExchange {
        id: ExchangeId,
        price: f64,
    }

    #[async_trait]
    impl TickerExchange for FixedExchange {
        fn id(&self) -> ExchangeId {
            self.id
        }

        async fn fetch_tickers(&self) -> Result<Vec<PriceObservation>, ExchangeError> {
            Ok(vec![PriceObservation {
                exchange: self.id,
                symbol: "BTC/USD".to_string(),
                price: self.price,
                timestamp: Utc::now(),
            }])
        }
    }

    fn wide_market() -> Vec<Arc<dyn TickerExchange>> {
        // 2% gross spread, well above any fee drag used below
        vec![
            Arc::new(FixedExchange {
                id: ExchangeId::Binance,
                price: 100.0,
            }),
            Arc::new(FixedExchange {
                id: ExchangeId::Coinbase,
                price: 102.0,
            }),
        ]
    }

    #[tokio::test]
    async fn qualifying_requires_net_spread_over_minimum() {
        // gross 2%, fee 0.3% per leg -> net 1.394%
        let params = SimulatorParams {
            min_spread_percent: 1.5,
            ..Default::default()
        };
        let (mut sim, _rx) = ArbitrageSimulator::new(wide_market(), params);
        sim.tick().await;
        assert!(sim.ledger.is_empty());

        let params = SimulatorParams {
            min_spread_percent: 1.0,
            ..Default::default()
        };
        let (mut sim, _rx) = ArbitrageSimulator::new(wide_market(), params);
        sim.tick().await;
        assert_eq!(sim.ledger.len(), 1);
    }

    #[tokio::test]
    async fn cooldown_limits_executions_across_ticks() {
        let params = SimulatorParams {
            min_spread_percent: 0.5,
            cooldown_secs: 3600,
            ..Default::default()
        };
        let (mut sim, _rx) = ArbitrageSimulator::new(wide_market(), params);

        sim.tick().await;
        sim.tick().await;
        sim.tick().await;
        assert_eq!(sim.ledger.len(), 1);
    }

    #[tokio::test]
    async fn zero_cooldown_executes_every_tick() {
        let params = SimulatorParams {
            min_spread_percent: 0.5,
            cooldown_secs: 0,
            ..Default::default()
        };
        let (mut sim, _rx) = ArbitrageSimulator::new(wide_market(), params);

        sim.tick().await;
        sim.tick().await;
        assert_eq!(sim.ledger.len(), 2);
    }

    #[tokio::test]
    async fn executed_trade_matches_profit_formula() {
        let params = SimulatorParams {
            min_spread_percent: 0.5,
            notional: 100.0,
            fee_percent: 0.3,
            ..Default::default()
        };
        let (mut sim, rx) = ArbitrageSimulator::new(wide_market(), params);
        sim.tick().await;

        let view = rx.borrow().clone();
        assert_eq!(view.trade_count, 1);
        let trade = &view.trades[0];
        // notional 100 at buy price 100 -> qty 1, net = 1.394
        assert!((trade.quantity - 1.0).abs() < 1e-9);
        assert!((trade.net_profit - 1.394).abs() < 1e-9);
        assert!((view.total_gain - 1.394).abs() < 1e-9);
    }

    #[tokio::test]
    async fn dry_run_records_nothing() {
        let params = SimulatorParams {
            min_spread_percent: 0.5,
            dry_run: true,
            ..Default::default()
        };
        let (mut sim, rx) = ArbitrageSimulator::new(wide_market(), params);

        sim.tick().await;
        sim.tick().await;
        assert!(sim.ledger.is_empty());
        assert_eq!(rx.borrow().trade_count, 0);
    }

    #[tokio::test]
    async fn table_keeps_growing_across_ticks() {
        let params = SimulatorParams {
            min_spread_percent: 99.0,
            ..Default::default()
        };
        let (mut sim, _rx) = ArbitrageSimulator::new(wide_market(), params);

        sim.tick().await;
        sim.tick().await;
        sim.tick().await;
        // 3 cycles x 2 exchanges x 1 symbol
        assert_eq!(sim.table.len(), 6);
    }
}
