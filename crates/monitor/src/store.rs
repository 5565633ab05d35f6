use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use interface::{PriceObservation, PriceTable};

/// Commands understood by the store task.
enum StoreCommand {
    Append(Vec<PriceObservation>),
    Snapshot(oneshot::Sender<PriceTable>),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("price store task is gone")]
    Closed,
}

/// Handle to the task that exclusively owns the price table. All writers
/// and readers go through the command channel; there is no shared lock.
#[derive(Clone)]
pub struct PriceStore {
    tx: mpsc::Sender<StoreCommand>,
}

impl PriceStore {
    /// Spawn the owning task and return a cloneable handle.
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::channel(32);

        tokio::spawn(async move {
            let mut table = PriceTable::new();
            while let Some(cmd) = rx.recv().await {
                match cmd {
                    StoreCommand::Append(batch) => table.append(batch),
                    StoreCommand::Snapshot(reply) => {
                        // receiver may have hung up; nothing to do then
                        let _ = reply.send(table.clone());
                    }
                }
            }
        });

        Self { tx }
    }

    pub async fn append(&self, batch: Vec<PriceObservation>) -> Result<(), StoreError> {
        self.tx
            .send(StoreCommand::Append(batch))
            .await
            .map_err(|_| StoreError::Closed)
    }

    /// Full copy of the table as of now. Cost grows with run length.
    pub async fn snapshot(&self) -> Result<PriceTable, StoreError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(StoreCommand::Snapshot(reply_tx))
            .await
            .map_err(|_| StoreError::Closed)?;
        reply_rx.await.map_err(|_| StoreError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use interface::ExchangeId;

    fn obs(exchange: ExchangeId, symbol: &str, price: f64) -> PriceObservation {
        PriceObservation {
            exchange,
            symbol: symbol.to_string(),
            price,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn appended_batches_show_up_in_snapshots() {
        let store = PriceStore::spawn();

        store
            .append(vec![
                obs(ExchangeId::Binance, "BTC/USD", 100.0),
                obs(ExchangeId::Coinbase, "BTC/USD", 101.0),
            ])
            .await
            .unwrap();
        store
            .append(vec![obs(ExchangeId::Binance, "BTC/USD", 100.5)])
            .await
            .unwrap();

        let table = store.snapshot().await.unwrap();
        assert_eq!(table.len(), 3);
        // insertion order preserved
        assert!((table.observations()[2].price - 100.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn snapshot_of_empty_store_is_empty() {
        let store = PriceStore::spawn();
        let table = store.snapshot().await.unwrap();
        assert!(table.is_empty());
    }
}
