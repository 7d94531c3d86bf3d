//! Order events - immutable facts recorded after command processing

use super::record::LineItem;
use super::types::ItemOrigin;
use crate::models::{PaymentMethod, PaymentStatus};
use crate::sync::SyncChannel;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order event - immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Event unique ID
    pub event_id: String,
    /// Global sequence number (ordering within the audit log)
    pub sequence: u64,
    /// Order this event belongs to (0 for catalog-only events)
    pub order_id: i64,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Operator who triggered this event
    pub operator_id: i64,
    /// Operator name (snapshot for audit)
    pub operator_name: String,
    /// Command that triggered this event (for audit tracing)
    pub command_id: String,
    /// Event type
    pub event_type: OrderEventType,
    /// Event payload
    pub payload: EventPayload,
}

/// Event type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    // Lifecycle
    OrderCreated,
    OrderReady,
    OrderServed,
    OrderDeleted,

    // Items
    ItemsAdded,
    ItemReady,
    ItemDecremented,
    ItemRemoved,

    // Invoice
    InvoiceCreated,
    InvoiceUpdated,
    InvoicePaid,
    InvoiceRefunded,

    // Catalog
    StockAdjusted,
}

impl OrderEventType {
    /// Dashboard channels whose state this event changes
    pub fn channels(&self) -> &'static [SyncChannel] {
        use OrderEventType::*;
        match self {
            OrderCreated | ItemsAdded | ItemDecremented | ItemRemoved | OrderDeleted => {
                &[SyncChannel::Kitchen, SyncChannel::Stock]
            }
            OrderReady | OrderServed | ItemReady => &[SyncChannel::Kitchen],
            InvoiceRefunded | StockAdjusted => &[SyncChannel::Stock],
            InvoiceCreated | InvoiceUpdated | InvoicePaid => &[],
        }
    }
}

impl std::fmt::Display for OrderEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderEventType::OrderCreated => "ORDER_CREATED",
            OrderEventType::OrderReady => "ORDER_READY",
            OrderEventType::OrderServed => "ORDER_SERVED",
            OrderEventType::OrderDeleted => "ORDER_DELETED",
            OrderEventType::ItemsAdded => "ITEMS_ADDED",
            OrderEventType::ItemReady => "ITEM_READY",
            OrderEventType::ItemDecremented => "ITEM_DECREMENTED",
            OrderEventType::ItemRemoved => "ITEM_REMOVED",
            OrderEventType::InvoiceCreated => "INVOICE_CREATED",
            OrderEventType::InvoiceUpdated => "INVOICE_UPDATED",
            OrderEventType::InvoicePaid => "INVOICE_PAID",
            OrderEventType::InvoiceRefunded => "INVOICE_REFUNDED",
            OrderEventType::StockAdjusted => "STOCK_ADJUSTED",
        };
        f.write_str(name)
    }
}

/// Event payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    OrderCreated {
        table_id: i64,
        table_number: u32,
        items: Vec<LineItem>,
        table_occupied: bool,
    },
    OrderReady {
        /// true when completed by an operator rather than by the last item
        forced: bool,
        items_completed: usize,
    },
    OrderServed {
        total: Decimal,
        table_freed: bool,
    },
    OrderDeleted {
        table_freed: bool,
    },
    ItemsAdded {
        items: Vec<LineItem>,
        origin: ItemOrigin,
        /// Order moved back to IN_PROGRESS
        reopened: bool,
    },
    ItemReady {
        item_id: i64,
        product_name: String,
    },
    ItemDecremented {
        item_id: i64,
        quantity: u32,
    },
    ItemRemoved {
        item_id: i64,
        product_id: i64,
        quantity: u32,
    },
    InvoiceCreated {
        invoice_id: i64,
        invoice_number: String,
        total: Decimal,
    },
    InvoiceUpdated {
        invoice_id: i64,
        subtotal: Decimal,
        total: Decimal,
    },
    InvoicePaid {
        invoice_id: i64,
        method: PaymentMethod,
        amount: Decimal,
        change: Decimal,
        payment_status: PaymentStatus,
        table_freed: bool,
    },
    InvoiceRefunded {
        invoice_id: i64,
        amount: Decimal,
        reason: String,
        restocked_units: u32,
    },
    StockAdjusted {
        product_id: i64,
        delta: i64,
        stock: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl EventPayload {
    pub fn event_type(&self) -> OrderEventType {
        match self {
            EventPayload::OrderCreated { .. } => OrderEventType::OrderCreated,
            EventPayload::OrderReady { .. } => OrderEventType::OrderReady,
            EventPayload::OrderServed { .. } => OrderEventType::OrderServed,
            EventPayload::OrderDeleted { .. } => OrderEventType::OrderDeleted,
            EventPayload::ItemsAdded { .. } => OrderEventType::ItemsAdded,
            EventPayload::ItemReady { .. } => OrderEventType::ItemReady,
            EventPayload::ItemDecremented { .. } => OrderEventType::ItemDecremented,
            EventPayload::ItemRemoved { .. } => OrderEventType::ItemRemoved,
            EventPayload::InvoiceCreated { .. } => OrderEventType::InvoiceCreated,
            EventPayload::InvoiceUpdated { .. } => OrderEventType::InvoiceUpdated,
            EventPayload::InvoicePaid { .. } => OrderEventType::InvoicePaid,
            EventPayload::InvoiceRefunded { .. } => OrderEventType::InvoiceRefunded,
            EventPayload::StockAdjusted { .. } => OrderEventType::StockAdjusted,
        }
    }
}
