//! Long-poll API Handlers

use std::time::Duration;

use axum::extract::{Query, State};
use serde::Deserialize;
use shared::PollResult;
use shared::order::{KitchenBoard, StockBoard};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Default, Deserialize)]
pub struct PollQuery {
    #[serde(default)]
    pub digest: Option<String>,
    /// Seconds; clamped by the notifier
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl PollQuery {
    fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    fn digest(&self) -> Option<&str> {
        self.digest.as_deref().filter(|d| !d.is_empty())
    }
}

/// GET /api/poll/kitchen
pub async fn kitchen(
    State(state): State<ServerState>,
    Query(query): Query<PollQuery>,
) -> AppResult<ApiResponse<PollResult<KitchenBoard>>> {
    ok(state
        .notifier
        .poll_kitchen(query.digest(), query.timeout())
        .await?)
}

/// GET /api/poll/stock
pub async fn stock(
    State(state): State<ServerState>,
    Query(query): Query<PollQuery>,
) -> AppResult<ApiResponse<PollResult<StockBoard>>> {
    ok(state
        .notifier
        .poll_stock(query.digest(), query.timeout())
        .await?)
}
