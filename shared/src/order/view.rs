//! Read models for kitchen, waiter and cashier dashboards

use super::record::{LineItem, Order};
use super::types::OrderStatus;
use crate::models::{Invoice, StockLevel};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Derived, read-time urgency of an order or pending item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// Younger than the "fresh" threshold
    Fresh,
    Normal,
    /// Older than the "urgent" threshold
    Urgent,
}

/// One order as shown on the kitchen board
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KitchenOrderView {
    pub order_id: i64,
    pub table_number: u32,
    pub table_label: String,
    pub waiter_name: String,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: i64,
    pub age_minutes: i64,
    pub priority: Priority,
    pub pending_count: usize,
    /// Items in creation order
    pub items: Vec<LineItem>,
}

/// Kitchen board: active orders, oldest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct KitchenBoard {
    pub orders: Vec<KitchenOrderView>,
    pub pending_items: usize,
    pub urgent_orders: usize,
}

/// A pending line item with its order context
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingItemView {
    pub order_id: i64,
    pub table_number: u32,
    pub item: LineItem,
    pub age_minutes: i64,
}

/// Pending items grouped by urgency, oldest first in each bucket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PriorityBuckets {
    pub urgent: Vec<PendingItemView>,
    pub normal: Vec<PendingItemView>,
    pub fresh: Vec<PendingItemView>,
}

/// Short order summary for waiter listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSummary {
    pub order_id: i64,
    pub table_number: u32,
    pub waiter_id: i64,
    pub waiter_name: String,
    pub status: OrderStatus,
    pub total: Decimal,
    pub item_count: usize,
    pub pending_count: usize,
    pub has_pending_invoice: bool,
    pub created_at: i64,
}

/// Stock board for waiter dashboards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StockBoard {
    pub products: Vec<StockLevel>,
    /// Orders created in the last few minutes, newest first
    pub recent_orders: Vec<OrderSummary>,
}

/// Full order detail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDetail {
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<Invoice>,
    pub original_items: Vec<LineItem>,
    pub added_items: Vec<LineItem>,
    pub pending_count: usize,
    pub completed: bool,
}

/// Invoice with the order it bills (table, waiter, line items)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub order: OrderDetail,
}
