//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::{CustomerInfo, Invoice};
use shared::order::{CommandResponse, OrderCommandPayload, OrderDetail, OrderItemInput, OrderSummary};

use crate::api::actor::Actor;
use crate::api::command::dispatch;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ok};

/// Query params for listing open orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub waiter_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub table_id: i64,
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemsRequest {
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateInvoiceRequest {
    #[serde(default)]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub apply_tax: bool,
    #[serde(default)]
    pub customer: CustomerInfo,
}

/// GET /api/orders - 未结订单 (可按服务员过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<OrderSummary>>> {
    ok(state.orders.open_orders(query.waiter_id)?)
}

/// GET /api/orders/{id} - 订单详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<OrderDetail>> {
    let detail = state
        .orders
        .order_detail(id)?
        .ok_or_else(|| AppError::not_found(format!("Order {}", id)))?;
    ok(detail)
}

/// POST /api/orders - 开单
pub async fn create(
    State(state): State<ServerState>,
    actor: Actor,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let payload = OrderCommandPayload::CreateOrder {
        table_id: req.table_id,
        items: req.items,
        note: req.note,
    };
    ok(dispatch(&state, &actor, &headers, payload)?)
}

/// POST /api/orders/{id}/items - 加菜
pub async fn add_items(
    State(state): State<ServerState>,
    actor: Actor,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<AddItemsRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let payload = OrderCommandPayload::AddItems {
        order_id: id,
        items: req.items,
    };
    ok(dispatch(&state, &actor, &headers, payload)?)
}

/// POST /api/orders/{id}/complete - 强制出齐
pub async fn complete(
    State(state): State<ServerState>,
    actor: Actor,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let payload = OrderCommandPayload::CompleteOrder { order_id: id };
    ok(dispatch(&state, &actor, &headers, payload)?)
}

/// POST /api/orders/{id}/serve - 上菜 (自动开票)
pub async fn serve(
    State(state): State<ServerState>,
    actor: Actor,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let payload = OrderCommandPayload::ServeOrder { order_id: id };
    ok(dispatch(&state, &actor, &headers, payload)?)
}

/// POST /api/orders/{id}/invoice - 手动开票 (折扣/税)
pub async fn create_invoice(
    State(state): State<ServerState>,
    actor: Actor,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<CreateInvoiceRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let payload = OrderCommandPayload::CreateInvoice {
        order_id: id,
        discount_percent: req.discount_percent,
        apply_tax: req.apply_tax,
        customer: req.customer,
    };
    ok(dispatch(&state, &actor, &headers, payload)?)
}

/// GET /api/orders/{id}/invoice - 订单发票
pub async fn get_invoice(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Invoice>> {
    let invoice = state
        .orders
        .invoice_for_order(id)?
        .ok_or_else(|| AppError::not_found(format!("Invoice for order {}", id)))?;
    ok(invoice)
}
