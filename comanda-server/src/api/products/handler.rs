//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Deserialize;
use shared::models::Product;
use shared::order::{CommandResponse, OrderCommandPayload};

use crate::api::actor::Actor;
use crate::api::command::dispatch;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub delta: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

/// GET /api/products - 获取所有菜品
pub async fn list(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<Product>>> {
    ok(state.orders.products()?)
}

/// POST /api/products/{id}/stock - 库存调整
pub async fn adjust_stock(
    State(state): State<ServerState>,
    actor: Actor,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<AdjustStockRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let payload = OrderCommandPayload::AdjustStock {
        product_id: id,
        delta: req.delta,
        reason: req.reason,
    };
    ok(dispatch(&state, &actor, &headers, payload)?)
}
