use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use interface::spread;

use crate::store::PriceStore;

#[derive(Clone)]
pub struct AppState {
    pub store: PriceStore,
}

impl AppState {
    pub fn new(store: PriceStore) -> Self {
        Self { store }
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Full price history, one row per observation.
async fn prices_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.store.snapshot().await {
        Ok(table) => Json(table.into_observations()).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Latest observation per (symbol, exchange).
async fn latest_prices_handler(State(state): State<Arc<AppState>>) -> Response {
    let table = match state.store.snapshot().await {
        Ok(table) => table,
        Err(e) => return internal_error(e),
    };

    let mut latest = Vec::new();
    for symbol in table.symbols() {
        for obs in spread::latest_by_exchange(table.observations(), &symbol).into_values() {
            latest.push(obs.clone());
        }
    }
    Json(latest).into_response()
}

/// Max pairwise spread per symbol, from the latest prices.
async fn spreads_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.store.snapshot().await {
        Ok(table) => Json(spread::max_spreads(table.observations())).into_response(),
        Err(e) => internal_error(e),
    }
}

fn internal_error(e: impl std::fmt::Display) -> Response {
    error!("request failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": format!("{}", e) })),
    )
        .into_response()
}

pub async fn serve(state: Arc<AppState>, port: u16) -> eyre::Result<()> {
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/prices", get(prices_handler))
        .route("/prices/latest", get(latest_prices_handler))
        .route("/spreads", get(spreads_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
