//! Command dispatch shared by the write handlers

use axum::http::HeaderMap;
use shared::order::{CommandResponse, OrderCommand, OrderCommandPayload};

use crate::api::actor::Actor;
use crate::core::ServerState;
use crate::guard::GuardTier;
use crate::utils::{AppError, AppResult, command_error};

/// Client-supplied command id for idempotent retries
pub const COMMAND_ID_HEADER: &str = "x-command-id";

fn command_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(COMMAND_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Execute a command for `actor` under the de-duplication guard
///
/// A rejected command surfaces as `AppError` and clears the guard record.
pub fn dispatch(
    state: &ServerState,
    actor: &Actor,
    headers: &HeaderMap,
    payload: OrderCommandPayload,
) -> AppResult<CommandResponse> {
    let action = payload.action_name();
    let tier = GuardTier::for_action(action);

    state
        .guard
        .guarded(actor.id, action, Some(&payload), tier, || {
            let mut cmd = OrderCommand::new(actor.id, actor.name.clone(), payload.clone());
            if let Some(id) = command_id(headers) {
                cmd = cmd.with_command_id(id);
            }
            let response = state.orders.execute_command(cmd);
            if response.success {
                return Ok(response);
            }
            Err(response
                .error
                .map(command_error)
                .unwrap_or_else(|| AppError::internal("Command failed without error details")))
        })
}
