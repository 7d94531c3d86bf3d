//! Line Item API Handlers

use axum::{
    extract::{Path, State},
    http::HeaderMap,
};
use shared::order::{CommandResponse, OrderCommandPayload};

use crate::api::actor::Actor;
use crate::api::command::dispatch;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

/// POST /api/items/{id}/ready - 单品出餐
pub async fn mark_ready(
    State(state): State<ServerState>,
    actor: Actor,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let payload = OrderCommandPayload::MarkItemReady { item_id: id };
    ok(dispatch(&state, &actor, &headers, payload)?)
}

/// POST /api/items/{id}/decrement - 数量减一
pub async fn decrement(
    State(state): State<ServerState>,
    actor: Actor,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let payload = OrderCommandPayload::DecrementItem { item_id: id };
    ok(dispatch(&state, &actor, &headers, payload)?)
}

/// DELETE /api/items/{id} - 删除待制作菜品
pub async fn remove(
    State(state): State<ServerState>,
    actor: Actor,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let payload = OrderCommandPayload::RemoveItem { item_id: id };
    ok(dispatch(&state, &actor, &headers, payload)?)
}
