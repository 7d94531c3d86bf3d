//! Kitchen API Handlers

use axum::extract::State;
use shared::order::{KitchenBoard, PriorityBuckets};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

/// GET /api/kitchen/orders - 厨房看板
pub async fn board(State(state): State<ServerState>) -> AppResult<ApiResponse<KitchenBoard>> {
    ok(state.orders.kitchen_board()?)
}

/// GET /api/kitchen/priority - 按等待时间分组的待制作菜品
pub async fn priority(
    State(state): State<ServerState>,
) -> AppResult<ApiResponse<PriorityBuckets>> {
    ok(state.orders.pending_by_priority()?)
}
