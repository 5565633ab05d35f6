use async_trait::async_trait;
use chrono::Utc;
use futures::future::try_join_all;
use serde::Deserialize;

use interface::{ExchangeError, ExchangeId, PriceObservation};

use crate::{base_asset, TickerExchange, DEFAULT_SYMBOLS};

const BASE_URL: &str = "https://api.binance.com";

#[derive(Clone)]
pub struct BinanceClient {
    http: reqwest::Client,
    symbols: Vec<String>,
}

impl BinanceClient {
    pub fn new() -> Self {
        Self::with_symbols(DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect())
    }

    pub fn with_symbols(symbols: Vec<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            symbols,
        }
    }

    async fn fetch_one(&self, symbol: &str) -> Result<PriceObservation, ExchangeError> {
        // Binance quotes USDT pairs; "BTC/USD" is served by BTCUSDT
        let pair = format!("{}USDT", base_asset(symbol));
        let url = format!("{BASE_URL}/api/v3/ticker/price?symbol={pair}");
        let ticker: BinanceTicker = self.http.get(&url).send().await?.json().await?;
        observation_from_ticker(symbol, &ticker)
    }
}

#[derive(Debug, Deserialize)]
struct BinanceTicker {
    #[allow(dead_code)]
    symbol: String,
    price: String,
}

fn observation_from_ticker(
    symbol: &str,
    ticker: &BinanceTicker,
) -> Result<PriceObservation, ExchangeError> {
    let price: f64 = ticker.price.parse().map_err(|_| {
        ExchangeError::Other(format!(
            "Binance: unparsable price {:?} for {}",
            ticker.price, symbol
        ))
    })?;

    if price <= 0.0 {
        return Err(ExchangeError::Other(format!(
            "Binance: non-positive price {} for {}",
            price, symbol
        )));
    }

    Ok(PriceObservation {
        exchange: ExchangeId::Binance,
        symbol: symbol.to_string(),
        price,
        timestamp: Utc::now(),
    })
}

#[async_trait]
impl TickerExchange for BinanceClient {
    fn id(&self) -> ExchangeId {
        ExchangeId::Binance
    }

    async fn fetch_tickers(&self) -> Result<Vec<PriceObservation>, ExchangeError> {
        try_join_all(self.symbols.iter().map(|s| self.fetch_one(s))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ticker_payload() {
        let ticker: BinanceTicker =
            serde_json::from_str(r#"{"symbol":"BTCUSDT","price":"104250.10000000"}"#).unwrap();

        let obs = observation_from_ticker("BTC/USD", &ticker).unwrap();
        assert_eq!(obs.exchange, ExchangeId::Binance);
        assert_eq!(obs.symbol, "BTC/USD");
        assert!((obs.price - 104250.1).abs() < 1e-9);
    }

    #[test]
    fn rejects_non_positive_price() {
        let ticker: BinanceTicker =
            serde_json::from_str(r#"{"symbol":"BTCUSDT","price":"0.00000000"}"#).unwrap();
        assert!(observation_from_ticker("BTC/USD", &ticker).is_err());
    }
}
