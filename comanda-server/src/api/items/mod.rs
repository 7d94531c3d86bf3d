//! Line Item API Module
//!
//! Kitchen and waiter actions on single line items.

mod handler;

use axum::{Router, routing::{delete, post}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/items", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{id}", delete(handler::remove))
        .route("/{id}/ready", post(handler::mark_ready))
        .route("/{id}/decrement", post(handler::decrement))
}
