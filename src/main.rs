use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

mod config;
mod error;
mod handlers;
mod ledger;
mod models;
mod seed;

use crate::config::Config;
use crate::ledger::Ledger;

/// Shared application state, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
}

impl AppState {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Arc::new(ledger),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,inventory_service=debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    let ledger = Ledger::new(config.catalog.iter().cloned());
    for level in ledger.snapshot() {
        info!(product_id = %level.product_id, quantity = level.quantity, "Seeded stock");
    }

    let app = build_router(AppState::new(ledger));

    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        // ── Health ──────────────────────────────────────────────────────────
        .route("/health", get(handlers::health))

        // ── Inventory ───────────────────────────────────────────────────────
        .route("/api/inventory", get(handlers::inventory::list_stock))
        .route("/api/inventory/:product_id", get(handlers::inventory::get_stock))
        .route(
            "/api/inventory/check/:product_id/:quantity",
            get(handlers::inventory::check_stock),
        )
        .route("/api/inventory/order", post(handlers::inventory::create_order))

        // ── Stress test ─────────────────────────────────────────────────────
        .route("/api/stress-test", post(handlers::stress::run_stress_test))

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
