use std::collections::BTreeMap;

use crate::model::{ExchangeId, PriceObservation, SpreadResult};

/// Latest observation per exchange for one symbol. The BTreeMap key order
/// is the lexicographic exchange-name order the pair scan relies on.
pub fn latest_by_exchange<'a>(
    observations: &'a [PriceObservation],
    symbol: &str,
) -> BTreeMap<ExchangeId, &'a PriceObservation> {
    let mut latest = BTreeMap::new();
    for obs in observations.iter().filter(|o| o.symbol == symbol) {
        // later rows overwrite earlier ones
        latest.insert(obs.exchange, obs);
    }
    latest
}

/// Largest pairwise percentage spread for one symbol, computed from the
/// latest observation per exchange. Returns None when fewer than two
/// exchanges report the symbol.
///
/// Ties are broken deterministically: pairs are scanned in exchange-name
/// order and the maximum is taken with strict greater-than, so the first
/// pair in that order wins.
pub fn max_spread(observations: &[PriceObservation], symbol: &str) -> Option<SpreadResult> {
    let latest = latest_by_exchange(observations, symbol);
    if latest.len() < 2 {
        return None;
    }

    let entries: Vec<(ExchangeId, &PriceObservation)> =
        latest.into_iter().collect();

    let mut best: Option<SpreadResult> = None;
    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            let (ex_a, obs_a) = entries[i];
            let (ex_b, obs_b) = entries[j];

            // cheaper leg is the buy side, so the spread is never negative
            let ((buy_ex, buy), (sell_ex, sell)) = if obs_a.price <= obs_b.price {
                ((ex_a, obs_a), (ex_b, obs_b))
            } else {
                ((ex_b, obs_b), (ex_a, obs_a))
            };

            if buy.price <= 0.0 {
                continue;
            }

            let spread_percent = (sell.price - buy.price) / buy.price * 100.0;
            if best
                .as_ref()
                .map_or(true, |b| spread_percent > b.spread_percent)
            {
                best = Some(SpreadResult {
                    symbol: symbol.to_string(),
                    buy_exchange: buy_ex,
                    sell_exchange: sell_ex,
                    buy_price: buy.price,
                    sell_price: sell.price,
                    spread_percent,
                });
            }
        }
    }

    best
}

/// Max spread per distinct symbol across the whole table.
pub fn max_spreads(observations: &[PriceObservation]) -> Vec<SpreadResult> {
    let mut symbols: Vec<&str> = observations.iter().map(|o| o.symbol.as_str()).collect();
    symbols.sort();
    symbols.dedup();

    symbols
        .into_iter()
        .filter_map(|symbol| max_spread(observations, symbol))
        .collect()
}

/// Net profit of buying `quantity` units at `buy` and selling at `sell`,
/// with a flat fee percentage charged on both legs:
/// net = qty * (sell * (1 - fee/100) - buy * (1 + fee/100))
pub fn net_profit(buy: f64, sell: f64, fee_percent: f64, quantity: f64) -> f64 {
    let fee = fee_percent / 100.0;
    quantity * (sell * (1.0 - fee) - buy * (1.0 + fee))
}

/// Net spread relative to the buy leg, fees applied to both legs.
pub fn net_spread_percent(buy: f64, sell: f64, fee_percent: f64) -> f64 {
    if buy <= 0.0 {
        return 0.0;
    }
    net_profit(buy, sell, fee_percent, 1.0) / buy * 100.0
}
