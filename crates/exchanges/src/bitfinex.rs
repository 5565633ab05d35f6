use async_trait::async_trait;
use chrono::Utc;
use futures::future::try_join_all;
use serde_json::Value;

use interface::{ExchangeError, ExchangeId, PriceObservation};

use crate::{base_asset, TickerExchange, DEFAULT_SYMBOLS};

const BASE_URL: &str = "https://api-pub.bitfinex.com";

// Bitfinex tickers are positional arrays; LAST_PRICE sits at index 6:
// [BID, BID_SIZE, ASK, ASK_SIZE, DAILY_CHANGE, DAILY_CHANGE_RELATIVE,
//  LAST_PRICE, VOLUME, HIGH, LOW]
const LAST_PRICE_INDEX: usize = 6;

#[derive(Clone)]
pub struct BitfinexClient {
    http: reqwest::Client,
    symbols: Vec<String>,
}

impl BitfinexClient {
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
        let pair = format!("t{}USD", base_asset(symbol));
        let url = format!("{BASE_URL}/v2/ticker/{pair}");
        let ticker: Vec<Value> = self.http.get(&url).send().await?.json().await?;
        observation_from_ticker(symbol, &ticker)
    }
}

fn observation_from_ticker(
    symbol: &str,
    ticker: &[Value],
) -> Result<PriceObservation, ExchangeError> {
    let price = ticker
        .get(LAST_PRICE_INDEX)
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            ExchangeError::Other(format!(
                "Bitfinex: no last price at index {} for {}",
                LAST_PRICE_INDEX, symbol
            ))
        })?;

    if price <= 0.0 {
        return Err(ExchangeError::Other(format!(
            "Bitfinex: non-positive price {} for {}",
            price, symbol
        )));
    }

    Ok(PriceObservation {
        exchange: ExchangeId::Bitfinex,
        symbol: symbol.to_string(),
        price,
        timestamp: Utc::now(),
    })
}

#[async_trait]
impl TickerExchange for BitfinexClient {
    fn id(&self) -> ExchangeId {
        ExchangeId::Bitfinex
    }

    async fn fetch_tickers(&self) -> Result<Vec<PriceObservation>, ExchangeError> {
        try_join_all(self.symbols.iter().map(|s| self.fetch_one(s))).await
    }
}
