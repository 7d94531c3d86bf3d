//! Order-related value types: states, inputs, per-command results and
//! command responses.

pub use crate::error::FailureKind;

use crate::error::ErrorCode;
use crate::models::{PaymentMethod, PaymentStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    New,
    InProgress,
    Ready,
    Served,
}

impl OrderStatus {
    /// Kitchen-relevant states (not yet served)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::New | Self::InProgress | Self::Ready)
    }

    /// States in which items may still be prepared or resized
    pub fn is_preparing(&self) -> bool {
        matches!(self, Self::New | Self::InProgress)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::InProgress => "IN_PROGRESS",
            Self::Ready => "READY",
            Self::Served => "SERVED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line item preparation status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    #[default]
    Pending,
    Ready,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Ready => "READY",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a line item entered the order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemOrigin {
    /// Part of the order as created
    #[default]
    Original,
    /// Added while the order was still open
    AddedLater,
    /// Added after the order was invoiced (invoice unpaid or partial)
    AddedPostInvoice,
}

/// Line item input for create / add commands
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItemInput {
    pub product_id: i64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl OrderItemInput {
    pub fn new(product_id: i64, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            note: None,
        }
    }
}

// ========== Command results ==========

/// Result of adding items to an existing order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AmendmentResult {
    pub order_id: i64,
    pub item_ids: Vec<i64>,
    pub items_added: usize,
    pub total_added: Decimal,
    pub origin: ItemOrigin,
    pub has_pending_invoice: bool,
    /// Invoice total after the amendment (only when an invoice is pending)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_total: Option<Decimal>,
    pub status: OrderStatus,
}

/// Result of marking a line item ready
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionStatus {
    pub order_id: i64,
    pub item_id: i64,
    pub order_completed: bool,
    pub pending_remaining: usize,
    pub status: OrderStatus,
}

/// Result of serving an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServeResult {
    pub order_id: i64,
    pub invoice_id: i64,
    pub invoice_number: String,
    /// false when an existing invoice was updated in place
    pub invoice_created: bool,
    pub table_freed: bool,
    pub total: Decimal,
}

/// Result of recording a payment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentResult {
    pub invoice_id: i64,
    pub order_id: i64,
    pub method: PaymentMethod,
    pub total: Decimal,
    pub amount: Decimal,
    /// Change due to the customer (zero when underpaid)
    pub change: Decimal,
    /// Remaining amount when underpaid (zero when fully paid)
    pub shortfall: Decimal,
    pub payment_status: PaymentStatus,
    pub table_freed: bool,
}

/// Result of a refund
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefundResult {
    pub invoice_id: i64,
    pub order_id: i64,
    pub refunded_amount: Decimal,
    pub restocked_units: u32,
}

/// Typed outcome of a successfully executed command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandOutcome {
    OrderCreated {
        order_id: i64,
        table_number: u32,
        item_ids: Vec<i64>,
        total: Decimal,
    },
    ItemsAdded(AmendmentResult),
    ItemReady(CompletionStatus),
    ItemDecremented {
        order_id: i64,
        item_id: i64,
        quantity: u32,
    },
    ItemRemoved {
        order_id: i64,
        item_id: i64,
        restocked: u32,
        order_deleted: bool,
    },
    OrderCompleted {
        order_id: i64,
        items_completed: usize,
    },
    OrderServed(ServeResult),
    InvoiceCreated {
        order_id: i64,
        invoice_id: i64,
        invoice_number: String,
        total: Decimal,
    },
    InvoicePaid(PaymentResult),
    InvoiceRefunded(RefundResult),
    StockAdjusted {
        product_id: i64,
        stock: u32,
    },
    /// The command id had already been processed
    Duplicate,
}

// ========== Command response ==========

/// Command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The command ID this responds to
    pub command_id: String,
    /// Whether the command succeeded
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CommandOutcome>,
    /// Error details if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(command_id: String, outcome: CommandOutcome) -> Self {
        Self {
            command_id,
            success: true,
            outcome: Some(outcome),
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            outcome: None,
            error: Some(error),
        }
    }

    pub fn duplicate(command_id: String) -> Self {
        Self::success(command_id, CommandOutcome::Duplicate)
    }
}

/// Command error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Command error codes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    InvalidInput,
    OrderNotFound,
    ItemNotFound,
    ProductNotFound,
    TableNotFound,
    InvoiceNotFound,
    ProductUnavailable,
    InvalidAmount,
    AlreadyReady,
    OrderAlreadyReady,
    OrderNotActive,
    AtMinimum,
    ItemNotPending,
    ItemsPending,
    NotReady,
    OrderClosed,
    InvoiceExists,
    AlreadyPaid,
    InvoiceRefunded,
    NotPaid,
    AmountExceedsTotal,
    InsufficientStock,
    TableUnavailable,
    TooSoon,
    InternalError,
    // Storage errors (ErrorCode 9xxx)
    StorageFull,
    StorageCorrupted,
    SystemBusy,
}

impl CommandErrorCode {
    /// Failure class, taken from the mapped wire code
    pub fn kind(&self) -> FailureKind {
        self.error_code().kind()
    }

    /// Unified error code used on the HTTP surface
    pub fn error_code(&self) -> ErrorCode {
        use CommandErrorCode::*;
        match self {
            InvalidInput => ErrorCode::ValidationFailed,
            OrderNotFound => ErrorCode::OrderNotFound,
            ItemNotFound => ErrorCode::OrderItemNotFound,
            ProductNotFound => ErrorCode::ProductNotFound,
            TableNotFound => ErrorCode::TableNotFound,
            InvoiceNotFound => ErrorCode::InvoiceNotFound,
            ProductUnavailable => ErrorCode::ProductUnavailable,
            InvalidAmount => ErrorCode::PaymentInvalidAmount,
            AlreadyReady => ErrorCode::ItemAlreadyReady,
            OrderAlreadyReady => ErrorCode::OrderAlreadyReady,
            OrderNotActive => ErrorCode::OrderNotActive,
            AtMinimum => ErrorCode::ItemAtMinimum,
            ItemNotPending => ErrorCode::ItemNotPending,
            ItemsPending => ErrorCode::OrderItemsPending,
            NotReady => ErrorCode::OrderNotReady,
            OrderClosed => ErrorCode::OrderClosed,
            InvoiceExists => ErrorCode::InvoiceExists,
            AlreadyPaid => ErrorCode::InvoiceAlreadyPaid,
            InvoiceRefunded => ErrorCode::InvoiceRefunded,
            NotPaid => ErrorCode::InvoiceNotPaid,
            AmountExceedsTotal => ErrorCode::RefundExceedsTotal,
            InsufficientStock => ErrorCode::ProductOutOfStock,
            TableUnavailable => ErrorCode::TableOccupied,
            TooSoon => ErrorCode::TooManyRequests,
            InternalError => ErrorCode::InternalError,
            StorageFull => ErrorCode::StorageFull,
            StorageCorrupted => ErrorCode::StorageCorrupted,
            SystemBusy => ErrorCode::SystemBusy,
        }
    }
}
