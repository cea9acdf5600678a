use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    ledger::Ledger,
    models::{OrderRequest, StockLevel},
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct StressParams {
    /// Number of concurrent "virtual users" (default: 20)
    pub concurrency: Option<usize>,
    /// Orders placed by each virtual user (default: 10)
    pub orders_per_user: Option<usize>,
    /// Product to hammer (default: first product in the catalog)
    pub product_id: Option<String>,
    /// Units per order (default: 1)
    pub quantity: Option<i64>,
    /// Pick a random quantity in 1..=5 for each order instead
    #[serde(default)]
    pub randomize: bool,
}

#[derive(Debug, Serialize)]
pub struct StressReport {
    pub product_id: String,
    pub concurrency: usize,
    pub orders_per_user: usize,
    pub total_orders: usize,
    pub initial_stock: i64,
    pub final_stock: i64,
    pub accepted: u64,
    pub rejected: u64,
    pub units_sold: i64,
    /// `initial_stock - final_stock == units_sold` and stock never went negative
    pub conserved: bool,
    pub total_elapsed_ms: f64,
    pub orders_per_second: f64,
}

/// Build the scratch ledger and pick the target product from one snapshot,
/// so the reported starting stock is exactly what the scratch run starts with.
fn scratch_run(
    snapshot: Vec<StockLevel>,
    product_id: Option<String>,
) -> AppResult<(String, Ledger, i64)> {
    let product_id = match product_id {
        Some(id) => id,
        None => snapshot
            .first()
            .map(|level| level.product_id.clone())
            .ok_or_else(|| AppError::BadRequest("catalog is empty".to_string()))?,
    };

    let scratch = Ledger::new(
        snapshot
            .into_iter()
            .map(|level| (level.product_id, level.quantity)),
    );
    let initial_stock = scratch
        .stock_of(&product_id)
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product_id)))?;

    Ok((product_id, scratch, initial_stock))
}

// ── POST /api/stress-test ────────────────────────────────────────────────────

/// Fire concurrent orders at a scratch copy of the current stock levels.
/// The live ledger is only read.
pub async fn run_stress_test(
    State(state): State<AppState>,
    Json(params): Json<StressParams>,
) -> AppResult<(StatusCode, Json<StressReport>)> {
    let concurrency = params.concurrency.unwrap_or(20).clamp(1, 200);
    let orders_per_user = params.orders_per_user.unwrap_or(10).clamp(1, 1_000);

    let (product_id, scratch, initial_stock) =
        scratch_run(state.ledger.snapshot(), params.product_id)?;
    let scratch = Arc::new(scratch);

    info!(
        product_id = %product_id,
        concurrency,
        orders_per_user,
        initial_stock,
        "Starting stress test"
    );

    let accepted = Arc::new(AtomicU64::new(0));
    let rejected = Arc::new(AtomicU64::new(0));
    let units_sold = Arc::new(AtomicI64::new(0));

    let total_start = Instant::now();
    let mut join_set: JoinSet<()> = JoinSet::new();

    for _ in 0..concurrency {
        let ledger = Arc::clone(&scratch);
        let accepted_c = Arc::clone(&accepted);
        let rejected_c = Arc::clone(&rejected);
        let sold_c = Arc::clone(&units_sold);
        let product_id = product_id.clone();
        let fixed_qty = params.quantity.unwrap_or(1);
        let randomize = params.randomize;

        join_set.spawn(async move {
            let mut rng = StdRng::from_entropy();

            for _ in 0..orders_per_user {
                let quantity = if randomize { rng.gen_range(1..=5) } else { fixed_qty };
                let order = OrderRequest {
                    product_id: product_id.clone(),
                    quantity,
                };

                match ledger.create_order(&order) {
                    Ok(()) => {
                        accepted_c.fetch_add(1, Ordering::Relaxed);
                        sold_c.fetch_add(quantity, Ordering::Relaxed);
                    }
                    Err(_) => {
                        rejected_c.fetch_add(1, Ordering::Relaxed);
                    }
                }

                tokio::task::yield_now().await;
            }
        });
    }

    // Wait for all tasks
    while (join_set.join_next().await).is_some() {}

    let total_elapsed = total_start.elapsed();
    let total_orders = concurrency * orders_per_user;
    let final_stock = scratch.stock_of(&product_id).unwrap_or(initial_stock);
    let units_sold = units_sold.load(Ordering::Relaxed);

    let report = StressReport {
        product_id,
        concurrency,
        orders_per_user,
        total_orders,
        initial_stock,
        final_stock,
        accepted: accepted.load(Ordering::Relaxed),
        rejected: rejected.load(Ordering::Relaxed),
        units_sold,
        conserved: final_stock >= 0 && initial_stock - final_stock == units_sold,
        total_elapsed_ms: total_elapsed.as_secs_f64() * 1000.0,
        orders_per_second: total_orders as f64 / total_elapsed.as_secs_f64().max(f64::EPSILON),
    };

    info!(
        accepted = report.accepted,
        rejected = report.rejected,
        final_stock,
        conserved = report.conserved,
        "Stress test complete"
    );

    Ok((StatusCode::OK, Json(report)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(Ledger::new([("P001", 100), ("P002", 50)]))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn oversubscribed_run_sells_exactly_the_stock() {
        let state = state();
        let params = StressParams {
            concurrency: Some(20),
            orders_per_user: Some(10),
            product_id: Some("P002".to_string()),
            quantity: Some(3),
            randomize: false,
        };

        let (status, Json(report)) = run_stress_test(State(state.clone()), Json(params))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(report.total_orders, 200);
        assert_eq!(report.accepted, 16);
        assert_eq!(report.rejected, 184);
        assert_eq!(report.final_stock, 2);
        assert!(report.conserved);
        // live stock untouched
        assert_eq!(state.ledger.stock_of("P002"), Some(50));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn randomized_run_conserves_units() {
        let params = StressParams {
            randomize: true,
            ..Default::default()
        };

        let (_, Json(report)) = run_stress_test(State(state()), Json(params)).await.unwrap();

        assert_eq!(report.product_id, "P001");
        assert!(report.conserved);
        assert!(report.final_stock >= 0);
        assert_eq!(report.accepted + report.rejected, report.total_orders as u64);
    }

    #[test]
    fn starting_stock_comes_from_the_snapshot() {
        let live = Ledger::new([("P001", 100), ("P002", 50)]);
        let snapshot = live.snapshot();

        // a live order lands after the snapshot was taken
        live.create_order(&OrderRequest {
            product_id: "P001".to_string(),
            quantity: 3,
        })
        .unwrap();

        let (product_id, scratch, initial_stock) = scratch_run(snapshot, None).unwrap();
        assert_eq!(product_id, "P001");
        assert_eq!(initial_stock, 100);
        assert_eq!(scratch.stock_of("P001"), Some(initial_stock));
        assert_eq!(live.stock_of("P001"), Some(97));
    }

    #[test]
    fn empty_catalog_is_a_bad_request() {
        let err = scratch_run(Vec::new(), None).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let params = StressParams {
            product_id: Some("P999".to_string()),
            ..Default::default()
        };

        let err = run_stress_test(State(state()), Json(params)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
