use std::{fs::OpenOptions, path::PathBuf};

use chrono::Local;
use tracing_appender::non_blocking;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Holds the tracing worker guards. Logging stops once this is dropped,
/// so main keeps it alive for the whole run.
pub struct TracingGuards {
    _file: tracing_appender::non_blocking::WorkerGuard,
    _stdout: tracing_appender::non_blocking::WorkerGuard,
}

/// Set up file plus stdout logging.
pub fn init_tracing() -> TracingGuards {
    // 1) file appender
    let (file_writer, file_guard) = custom_daily_file_appender("logs", "trade");

    // 2) stdout, also non-blocking
    let (stdout_writer, stdout_guard) = non_blocking(std::io::stdout());

    // 3) EnvFilter
    let env_filter = EnvFilter::from_default_env().add_directive("info".parse().unwrap());

    // 4) assemble layers; the file only gets INFO and above
    let file_filter = EnvFilter::new("info");

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer)
                .with_filter(file_filter),
        )
        .with(fmt::layer().with_writer(stdout_writer).with_ansi(true))
        .init();

    TracingGuards {
        _file: file_guard,
        _stdout: stdout_guard,
    }
}

/// Per-day log file, e.g. `logs/trade.2026-08-06.log`.
fn custom_daily_file_appender(
    base_dir: &str,
    prefix: &str,
) -> (
    non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
) {
    let date = Local::now().format("%Y-%m-%d").to_string();
    let filename = format!("{prefix}.{date}.log");

    let mut path = PathBuf::from(base_dir);
    path.push(filename);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create log directory");
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .expect("Failed to open custom log file");

    non_blocking(file)
}
