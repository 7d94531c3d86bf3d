//! Long-poll API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/poll/kitchen | GET | 厨房看板变更 |
//! | /api/poll/stock | GET | 库存变更 |
//!
//! Query: `digest` (last seen, optional), `timeout` (seconds, optional).

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/poll", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/kitchen", get(handler::kitchen))
        .route("/stock", get(handler::stock))
}
