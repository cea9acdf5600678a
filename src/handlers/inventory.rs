use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::{OrderRequest, OrderResponse, StockCheck, StockLevel},
    AppState,
};

// ── GET /api/inventory/check/:product_id/:quantity ───────────────────────────

pub async fn check_stock(
    State(state): State<AppState>,
    Path((product_id, quantity)): Path<(String, i64)>,
) -> Json<StockCheck> {
    Json(state.ledger.check_stock(&product_id, quantity))
}

// ── POST /api/inventory/order ────────────────────────────────────────────────

pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> AppResult<Json<OrderResponse>> {
    let Json(order) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    state.ledger.create_order(&order)?;
    Ok(Json(OrderResponse::created()))
}

// ── GET /api/inventory ───────────────────────────────────────────────────────

pub async fn list_stock(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let levels = state.ledger.snapshot();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "count": levels.len(),
            "data": levels,
        })),
    )
}

// ── GET /api/inventory/:product_id ───────────────────────────────────────────

pub async fn get_stock(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> AppResult<Json<StockLevel>> {
    let quantity = state
        .ledger
        .stock_of(&product_id)
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product_id)))?;
    Ok(Json(StockLevel {
        product_id,
        quantity,
    }))
}
