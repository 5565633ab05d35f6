use std::sync::Arc;

use color_eyre::eyre;
use structopt::StructOpt;
use tracing::{info, warn};

use exchanges::{BinanceClient, BitfinexClient, CoinbaseClient, TickerExchange};
use trade::arbitrage::{ArbitrageSimulator, SimulatorParams};
use trade::{logger, server};

#[derive(Debug, StructOpt)]
#[structopt(name = "trade", about = "Naive cross-exchange arbitrage simulator")]
enum Command {
    /// Run the simulator and its ledger API
    Run(RunOpts),
    /// Collect one batch of tickers, print current spreads, exit
    Scan,
}

#[derive(Debug, StructOpt)]
struct RunOpts {
    /// Port the ledger API listens on
    #[structopt(long, env = "TRADE_PORT", default_value = "12091")]
    port: u16,

    /// Seconds between evaluation ticks
    #[structopt(long, env = "TRADE_INTERVAL_SECS", default_value = "5")]
    interval_secs: u64,

    /// Flat fee percentage applied to both legs
    #[structopt(long, env = "TRADE_FEE_PERCENT", default_value = "0.3")]
    fee_percent: f64,

    /// Minimum net spread (percent) worth executing
    #[structopt(long, env = "TRADE_MIN_SPREAD_PERCENT", default_value = "0.5")]
    min_spread_percent: f64,

    /// Seconds that must elapse between two executions
    #[structopt(long, env = "TRADE_COOLDOWN_SECS", default_value = "60")]
    cooldown_secs: u64,

    /// Notional per trade in USD
    #[structopt(long, env = "TRADE_NOTIONAL", default_value = "100")]
    notional: f64,

    /// Evaluate and log opportunities without recording trades
    #[structopt(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // init error reporting
    color_eyre::install()?;

    // init logging (file + stdout)
    let _guards = logger::init_tracing();

    match Command::from_args() {
        Command::Run(opts) => run_simulator(opts).await,
        Command::Scan => run_scan().await,
    }
}

fn default_exchanges() -> Vec<Arc<dyn TickerExchange>> {
    vec![
        Arc::new(BinanceClient::new()),
        Arc::new(BitfinexClient::new()),
        Arc::new(CoinbaseClient::new()),
    ]
}

async fn run_simulator(opts: RunOpts) -> eyre::Result<()> {
    let params = SimulatorParams {
        fee_percent: opts.fee_percent,
        min_spread_percent: opts.min_spread_percent,
        cooldown_secs: opts.cooldown_secs,
        notional: opts.notional,
        interval_secs: opts.interval_secs,
        dry_run: opts.dry_run,
    };

    let (simulator, ledger_rx) = ArbitrageSimulator::new(default_exchanges(), params);

    // simulator in the background, ledger API in the foreground
    tokio::spawn(simulator.run_loop());
    server::start_server(ledger_rx, opts.port).await?;

    Ok(())
}

/// One-shot spread scan against the live ticker endpoints.
async fn run_scan() -> eyre::Result<()> {
    let exchanges = default_exchanges();

    let mut observations = Vec::new();
    for ex in &exchanges {
        match ex.fetch_tickers().await {
            Ok(mut batch) => observations.append(&mut batch),
            Err(e) => {
                warn!("ticker fetch error from {}: {:?}", ex.id(), e);
            }
        }
    }

    let spreads = interface::spread::max_spreads(&observations);
    info!("=== Current max spreads ({} symbols) ===", spreads.len());
    for s in &spreads {
        println!(
            "{}: buy {} @ {:.2}, sell {} @ {:.2}, spread {:.4}%",
            s.symbol, s.buy_exchange, s.buy_price, s.sell_exchange, s.sell_price, s.spread_percent
        );
    }

    Ok(())
}
