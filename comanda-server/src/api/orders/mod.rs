//! Order API Module
//!
//! Order lifecycle commands and order queries. All mutations go through
//! OrdersManager.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/items", post(handler::add_items))
        .route("/{id}/complete", post(handler::complete))
        .route("/{id}/serve", post(handler::serve))
        .route(
            "/{id}/invoice",
            get(handler::get_invoice).post(handler::create_invoice),
        )
}
