use std::{sync::Arc, time::Duration};

use color_eyre::eyre;
use structopt::StructOpt;
use tracing_subscriber::{fmt, EnvFilter};

use exchanges::{BinanceClient, BitfinexClient, CoinbaseClient, TickerExchange};
use monitor::server::AppState;
use monitor::store::PriceStore;

#[derive(Debug, StructOpt)]
#[structopt(name = "monitor", about = "Cross-exchange price spread monitor")]
struct Opt {
    /// Port the dashboard API listens on
    #[structopt(long, env = "MONITOR_PORT", default_value = "12090")]
    port: u16,

    /// Seconds between collection passes
    #[structopt(long, env = "MONITOR_INTERVAL_SECS", default_value = "5")]
    interval_secs: u64,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // init error reporting
    color_eyre::install()?;

    // init logging
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let opt = Opt::from_args();

    // the store task owns the price table
    let store = PriceStore::spawn();

    // set up ticker exchanges
    let exchanges: Vec<Arc<dyn TickerExchange>> = vec![
        Arc::new(BinanceClient::new()),
        Arc::new(BitfinexClient::new()),
        Arc::new(CoinbaseClient::new()),
    ];

    // start background collector
    monitor::collector::start_collect_loop(
        exchanges,
        store.clone(),
        Duration::from_secs(opt.interval_secs),
    );

    // start HTTP server
    let state = Arc::new(AppState::new(store));
    monitor::server::serve(state, opt.port).await?;

    Ok(())
}
