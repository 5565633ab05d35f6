use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use exchanges::TickerExchange;
use interface::PriceObservation;

use crate::store::PriceStore;

/// One collection pass. A failing exchange loses its whole batch for the
/// cycle; the pass itself never fails and nothing is retried.
pub async fn collect_batch(exchanges: &[Arc<dyn TickerExchange>]) -> Vec<PriceObservation> {
    let mut all = Vec::new();
    for ex in exchanges {
        match ex.fetch_tickers().await {
            Ok(mut batch) => all.append(&mut batch),
            Err(e) => {
                warn!("ticker fetch error from {}: {:?}", ex.id(), e);
            }
        }
    }
    all
}

pub fn start_collect_loop(
    exchanges: Vec<Arc<dyn TickerExchange>>,
    store: PriceStore,
    interval: Duration,
) {
    tokio::spawn(async move {
        info!(
            "collect loop started: {} exchanges, {}s interval",
            exchanges.len(),
            interval.as_secs()
        );
        loop {
            let batch = collect_batch(&exchanges).await;
            let count = batch.len();
            if let Err(e) = store.append(batch).await {
                warn!("price store append failed, stopping collector: {}", e);
                return;
            }
            info!("collected {} observations", count);

            sleep(interval).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use interface::{ExchangeError, ExchangeId};

    struct FixedExchange {
        id: ExchangeId,
        prices: Vec<(&'static str, f64)>,
    }

    #[async_trait]
    impl TickerExchange for FixedExchange {
        fn id(&self) -> ExchangeId {
            self.id
        }

        async fn fetch_tickers(&self) -> Result<Vec<PriceObservation>, ExchangeError> {
            Ok(self
                .prices
                .iter()
                .map(|(symbol, price)| PriceObservation {
                    exchange: self.id,
                    symbol: symbol.to_string(),
                    price: *price,
                    timestamp: Utc::now(),
                })
                .collect())
        }
    }

    struct BrokenExchange;

    #[async_trait]
    impl TickerExchange for BrokenExchange {
        fn id(&self) -> ExchangeId {
            ExchangeId::Bitfinex
        }

        async fn fetch_tickers(&self) -> Result<Vec<PriceObservation>, ExchangeError> {
            Err(ExchangeError::Other("ticker endpoint down".to_string()))
        }
    }

    #[tokio::test]
    async fn failing_exchange_drops_only_its_batch() {
        let exchanges: Vec<Arc<dyn TickerExchange>> = vec![
            Arc::new(FixedExchange {
                id: ExchangeId::Binance,
                prices: vec![("BTC/USD", 100.0), ("ETH/USD", 3000.0)],
            }),
            Arc::new(BrokenExchange),
            Arc::new(FixedExchange {
                id: ExchangeId::Coinbase,
                prices: vec![("BTC/USD", 101.0)],
            }),
        ];

        let batch = collect_batch(&exchanges).await;
        assert_eq!(batch.len(), 3);
        assert!(batch.iter().all(|o| o.exchange != ExchangeId::Bitfinex));
    }
}
