//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单生命周期
//! - [`items`] - 单品操作 (出餐、减量、删除)
//! - [`kitchen`] - 厨房看板
//! - [`invoices`] - 发票收款、退款
//! - [`tables`] - 桌台
//! - [`products`] - 菜品与库存调整
//! - [`poll`] - 长轮询变更通知
//! - [`stats`] - 系统统计
//!
//! 写操作统一经过 [`command::dispatch`]：防重复提交 → OrdersManager。

pub mod actor;
pub mod command;

pub mod health;
pub mod invoices;
pub mod items;
pub mod kitchen;
pub mod orders;
pub mod poll;
pub mod products;
pub mod stats;
pub mod tables;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppResult};

/// Build a router with all routes registered (no middleware, no state)
pub fn build_routes() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(items::router())
        .merge(kitchen::router())
        .merge(invoices::router())
        .merge(tables::router())
        .merge(products::router())
        .merge(poll::router())
        .merge(stats::router())
}

/// Build the fully configured application with middleware and state
pub fn build_router(state: ServerState) -> Router {
    build_routes()
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
