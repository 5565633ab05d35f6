use async_trait::async_trait;
use chrono::Utc;
use futures::future::try_join_all;
use serde::Deserialize;

use interface::{ExchangeError, ExchangeId, PriceObservation};

use crate::{base_asset, TickerExchange, DEFAULT_SYMBOLS};

const BASE_URL: &str = "https://api.coinbase.com";

#[derive(Clone)]
pub struct CoinbaseClient {
    http: reqwest::Client,
    symbols: Vec<String>,
}

impl CoinbaseClient {
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
        let pair = format!("{}-USD", base_asset(symbol));
        let url = format!("{BASE_URL}/v2/prices/{pair}/spot");
        let response: CoinbaseSpotResponse = self.http.get(&url).send().await?.json().await?;
        observation_from_spot(symbol, &response.data)
    }
}

// Coinbase nests the quote under "data": {"base","currency","amount"}
#[derive(Debug, Deserialize)]
struct CoinbaseSpotResponse {
    data: CoinbaseSpotPrice,
}

#[derive(Debug, Deserialize)]
struct CoinbaseSpotPrice {
    #[allow(dead_code)]
    base: String,
    #[allow(dead_code)]
    currency: String,
    amount: String,
}

fn observation_from_spot(
    symbol: &str,
    spot: &CoinbaseSpotPrice,
) -> Result<PriceObservation, ExchangeError> {
    let price: f64 = spot.amount.parse().map_err(|_| {
        ExchangeError::Other(format!(
            "Coinbase: unparsable amount {:?} for {}",
            spot.amount, symbol
        ))
    })?;

    if price <= 0.0 {
        return Err(ExchangeError::Other(format!(
            "Coinbase: non-positive price {} for {}",
            price, symbol
        )));
    }

    Ok(PriceObservation {
        exchange: ExchangeId::Coinbase,
        symbol: symbol.to_string(),
        price,
        timestamp: Utc::now(),
    })
}

#[async_trait]
impl TickerExchange for CoinbaseClient {
    fn id(&self) -> ExchangeId {
        ExchangeId::Coinbase
    }

    async fn fetch_tickers(&self) -> Result<Vec<PriceObservation>, ExchangeError> {
        try_join_all(self.symbols.iter().map(|s| self.fetch_one(s))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_spot_payload() {
        let response: CoinbaseSpotResponse = serde_json::from_str(
            r#"{"data":{"base":"ETH","currency":"USD","amount":"3412.55"}}"#,
        )
        .unwrap();

        let obs = observation_from_spot("ETH/USD", &response.data).unwrap();
        assert_eq!(obs.exchange, ExchangeId::Coinbase);
        assert_eq!(obs.symbol, "ETH/USD");
        assert!((obs.price - 3412.55).abs() < 1e-9);
    }

    #[test]
    fn rejects_unparsable_amount() {
        let response: CoinbaseSpotResponse =
            serde_json::from_str(r#"{"data":{"base":"ETH","currency":"USD","amount":"n/a"}}"#)
                .unwrap();
        assert!(observation_from_spot("ETH/USD", &response.data).is_err());
    }
}
