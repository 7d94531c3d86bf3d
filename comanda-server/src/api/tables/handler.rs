//! Dining Table API Handlers

use axum::extract::{Path, State};
use shared::models::DiningTable;
use shared::order::OrderDetail;

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

/// GET /api/tables - 获取所有桌台
pub async fn list(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<DiningTable>>> {
    ok(state.orders.tables()?)
}

/// GET /api/tables/{id}/order - 桌台当前订单 (无则 data 为空)
pub async fn current_order(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Option<OrderDetail>>> {
    ok(state.orders.order_for_table(id)?)
}
