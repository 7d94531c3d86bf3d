//! Order commands - requests from waiter, kitchen and cashier clients

use super::types::OrderItemInput;
use crate::models::{CustomerInfo, PaymentMethod};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order command envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCommand {
    /// Client-generated id, used for idempotent retries
    pub command_id: String,
    /// Client timestamp (Unix milliseconds)
    pub timestamp: i64,
    pub operator_id: i64,
    pub operator_name: String,
    pub payload: OrderCommandPayload,
}

impl OrderCommand {
    pub fn new(operator_id: i64, operator_name: impl Into<String>, payload: OrderCommandPayload) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            timestamp: crate::util::now_millis(),
            operator_id,
            operator_name: operator_name.into(),
            payload,
        }
    }

    /// Replace the generated command id (client retries reuse the same id)
    pub fn with_command_id(mut self, command_id: impl Into<String>) -> Self {
        self.command_id = command_id.into();
        self
    }
}

/// Command payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderCommandPayload {
    /// Open an order on a table with its first items
    CreateOrder {
        table_id: i64,
        items: Vec<OrderItemInput>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    /// Add items to an existing order
    AddItems {
        order_id: i64,
        items: Vec<OrderItemInput>,
    },
    /// Kitchen marks one line item ready
    MarkItemReady { item_id: i64 },
    /// Return one unit of a pending item to stock
    DecrementItem { item_id: i64 },
    /// Delete a pending line item
    RemoveItem { item_id: i64 },
    /// Force-complete: mark every pending item ready
    CompleteOrder { order_id: i64 },
    /// Serve a ready order and create or update its invoice
    ServeOrder { order_id: i64 },
    /// Explicit invoice creation with discount / tax
    CreateInvoice {
        order_id: i64,
        #[serde(default)]
        discount_percent: Decimal,
        #[serde(default)]
        apply_tax: bool,
        #[serde(default)]
        customer: CustomerInfo,
    },
    /// Record a payment against an invoice
    PayInvoice {
        invoice_id: i64,
        method: PaymentMethod,
        amount: Decimal,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    /// Refund a paid invoice
    RefundInvoice {
        invoice_id: i64,
        reason: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amount: Option<Decimal>,
    },
    /// Manual stock correction
    AdjustStock {
        product_id: i64,
        delta: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl OrderCommandPayload {
    /// Stable action name used in logs and de-duplication keys
    pub fn action_name(&self) -> &'static str {
        match self {
            Self::CreateOrder { .. } => "create_order",
            Self::AddItems { .. } => "add_items",
            Self::MarkItemReady { .. } => "mark_item_ready",
            Self::DecrementItem { .. } => "decrement_item",
            Self::RemoveItem { .. } => "remove_item",
            Self::CompleteOrder { .. } => "complete_order",
            Self::ServeOrder { .. } => "serve_order",
            Self::CreateInvoice { .. } => "create_invoice",
            Self::PayInvoice { .. } => "pay_invoice",
            Self::RefundInvoice { .. } => "refund_invoice",
            Self::AdjustStock { .. } => "adjust_stock",
        }
    }
}
