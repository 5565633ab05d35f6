use std::net::SocketAddr;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::arbitrage::LedgerView;

#[derive(Clone)]
struct AppState {
    ledger_rx: watch::Receiver<LedgerView>,
}

/// Ledger API. Reads the last view the simulator published; never touches
/// the simulator's own state.
pub async fn start_server(
    ledger_rx: watch::Receiver<LedgerView>,
    port: u16,
) -> eyre::Result<()> {
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/trades", get(trades_handler))
        .route("/summary", get(summary_handler))
        .layer(CorsLayer::permissive())
        .with_state(AppState { ledger_rx });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Ledger API server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Every executed pseudo-trade, oldest first.
async fn trades_handler(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.ledger_rx.borrow().clone();
    Json(view.trades)
}

/// Running total and last execution time.
async fn summary_handler(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.ledger_rx.borrow().clone();
    Json(serde_json::json!({
        "total_gain": view.total_gain,
        "trade_count": view.trade_count,
        "last_executed_at": view.last_executed_at,
    }))
}
