//! Invoice API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::{Invoice, PaymentMethod};
use shared::order::{CommandResponse, InvoiceDetail, OrderCommandPayload};

use crate::api::actor::Actor;
use crate::api::command::dispatch;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct PayRequest {
    pub method: PaymentMethod,
    pub amount: Decimal,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub reason: String,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

/// GET /api/invoices/pending - 未结清发票
pub async fn pending(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<Invoice>>> {
    ok(state.orders.pending_invoices()?)
}

/// GET /api/invoices/{id} - 发票详情 (含订单、桌台、服务员、明细)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<InvoiceDetail>> {
    let detail = state
        .orders
        .invoice_detail(id)?
        .ok_or_else(|| AppError::not_found(format!("Invoice {}", id)))?;
    ok(detail)
}

/// POST /api/invoices/{id}/pay - 收款
pub async fn pay(
    State(state): State<ServerState>,
    actor: Actor,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<PayRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let payload = OrderCommandPayload::PayInvoice {
        invoice_id: id,
        method: req.method,
        amount: req.amount,
        note: req.note,
    };
    ok(dispatch(&state, &actor, &headers, payload)?)
}

/// POST /api/invoices/{id}/refund - 退款
pub async fn refund(
    State(state): State<ServerState>,
    actor: Actor,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<RefundRequest>,
) -> AppResult<ApiResponse<CommandResponse>> {
    let payload = OrderCommandPayload::RefundInvoice {
        invoice_id: id,
        reason: req.reason,
        amount: req.amount,
    };
    ok(dispatch(&state, &actor, &headers, payload)?)
}
