//! Order aggregate: the order row and its owned line items

use super::types::{ItemOrigin, ItemStatus, OrderStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product entry within an order
///
/// `unit_price` is captured when the item is created and never follows later
/// catalog price changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    /// Product name snapshot for dashboards
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub status: ItemStatus,
    #[serde(default)]
    pub origin: ItemOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_at: Option<i64>,
}

impl LineItem {
    pub fn is_pending(&self) -> bool {
        self.status == ItemStatus::Pending
    }

    /// quantity × captured unit price
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A guest's tab at a table (or at a virtual delivery / to-go table)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: i64,
    pub table_id: i64,
    /// Table number snapshot (0 = delivery, 50 = to-go)
    pub table_number: u32,
    pub waiter_id: i64,
    pub waiter_name: String,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Items in creation order
    pub items: Vec<LineItem>,
    /// Σ quantity × unit price over all items
    pub total: Decimal,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_to_kitchen_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub served_at: Option<i64>,
    pub updated_at: i64,
}

impl Order {
    pub fn item(&self, item_id: i64) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: i64) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }

    /// Number of line items still PENDING
    pub fn pending_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_pending()).count()
    }

    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Recompute `total` from the current line items
    pub fn recalculate_total(&mut self) {
        self.total = self.items_total();
    }
}
