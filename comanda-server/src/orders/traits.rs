//! Command handling traits and the per-command execution context
//!
//! Actions read and write the order aggregate, the catalog and invoices
//! through [`CommandContext`], which operates directly on the open redb
//! write transaction. An action that returns `Err` leaves the transaction
//! uncommitted, so nothing it wrote survives.

use std::collections::BTreeSet;

use redb::WriteTransaction;
use rust_decimal::Decimal;
use shared::SyncChannel;
use shared::models::{DiningTable, Invoice, Product, TableStatus};
use shared::order::{CommandErrorCode, CommandOutcome, EventPayload, Order, OrderEvent, OrderStatus};
use thiserror::Error;

use super::storage::{IdKind, OrderStorage, StorageError};

/// Command metadata shared by every action
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub operator_id: i64,
    pub operator_name: String,
    /// Client timestamp (Unix milliseconds)
    pub timestamp: i64,
}

/// Domain rejections raised by actions
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Line item not found: {0}")]
    ItemNotFound(i64),

    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    #[error("Table not found: {0}")]
    TableNotFound(i64),

    #[error("Invoice not found: {0}")]
    InvoiceNotFound(i64),

    #[error("Product {0} is not available")]
    ProductUnavailable(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    #[error("Line item {0} is already READY")]
    AlreadyReady(i64),

    #[error("Order {0} is already READY")]
    OrderAlreadyReady(i64),

    #[error("Order {order_id} is {status}, not active")]
    OrderNotActive { order_id: i64, status: OrderStatus },

    #[error("Line item {0} is at quantity 1; mark it ready or remove it")]
    AtMinimum(i64),

    #[error("Line item {0} is not PENDING")]
    ItemNotPending(i64),

    #[error("Order {order_id} still has {pending} pending item(s)")]
    ItemsPending { order_id: i64, pending: usize },

    #[error("Order {order_id} is {status}, expected READY")]
    NotReady { order_id: i64, status: OrderStatus },

    #[error("Order {0} is closed for changes")]
    OrderClosed(i64),

    #[error("Order {0} already has an invoice")]
    InvoiceExists(i64),

    #[error("Invoice {0} is already PAID")]
    AlreadyPaid(i64),

    #[error("Invoice {0} has been REFUNDED")]
    InvoiceRefunded(i64),

    #[error("Invoice {0} is not PAID")]
    NotPaid(i64),

    #[error("Refund amount {amount} exceeds invoice total {total}")]
    AmountExceedsTotal { amount: Decimal, total: Decimal },

    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: u64,
        available: u32,
    },

    #[error("Table {0} is not free")]
    TableUnavailable(u32),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl OrderError {
    /// Wire error code of this rejection
    pub fn code(&self) -> CommandErrorCode {
        match self {
            OrderError::InvalidInput(_) => CommandErrorCode::InvalidInput,
            OrderError::OrderNotFound(_) => CommandErrorCode::OrderNotFound,
            OrderError::ItemNotFound(_) => CommandErrorCode::ItemNotFound,
            OrderError::ProductNotFound(_) => CommandErrorCode::ProductNotFound,
            OrderError::TableNotFound(_) => CommandErrorCode::TableNotFound,
            OrderError::InvoiceNotFound(_) => CommandErrorCode::InvoiceNotFound,
            OrderError::ProductUnavailable(_) => CommandErrorCode::ProductUnavailable,
            OrderError::InvalidAmount(_) => CommandErrorCode::InvalidAmount,
            OrderError::AlreadyReady(_) => CommandErrorCode::AlreadyReady,
            OrderError::OrderAlreadyReady(_) => CommandErrorCode::OrderAlreadyReady,
            OrderError::OrderNotActive { .. } => CommandErrorCode::OrderNotActive,
            OrderError::AtMinimum(_) => CommandErrorCode::AtMinimum,
            OrderError::ItemNotPending(_) => CommandErrorCode::ItemNotPending,
            OrderError::ItemsPending { .. } => CommandErrorCode::ItemsPending,
            OrderError::NotReady { .. } => CommandErrorCode::NotReady,
            OrderError::OrderClosed(_) => CommandErrorCode::OrderClosed,
            OrderError::InvoiceExists(_) => CommandErrorCode::InvoiceExists,
            OrderError::AlreadyPaid(_) => CommandErrorCode::AlreadyPaid,
            OrderError::InvoiceRefunded(_) => CommandErrorCode::InvoiceRefunded,
            OrderError::NotPaid(_) => CommandErrorCode::NotPaid,
            OrderError::AmountExceedsTotal { .. } => CommandErrorCode::AmountExceedsTotal,
            OrderError::InsufficientStock { .. } => CommandErrorCode::InsufficientStock,
            OrderError::TableUnavailable(_) => CommandErrorCode::TableUnavailable,
            OrderError::Storage(_) => CommandErrorCode::InternalError,
        }
    }
}

/// Events staged by an action, before sequence numbers are assigned
#[derive(Debug, Clone)]
struct StagedEvent {
    order_id: i64,
    payload: EventPayload,
}

/// Result of flushing staged events into the audit log
#[derive(Debug, Default)]
pub struct FlushedEvents {
    pub events: Vec<OrderEvent>,
    /// Channel versions bumped inside the transaction
    pub versions: Vec<(SyncChannel, u64)>,
}

/// Execution context for one command
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a OrderStorage,
    now: i64,
    staged: Vec<StagedEvent>,
}

impl<'a> CommandContext<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a OrderStorage, now: i64) -> Self {
        Self {
            txn,
            storage,
            now,
            staged: Vec::new(),
        }
    }

    /// Server time of this command (Unix milliseconds)
    pub fn now(&self) -> i64 {
        self.now
    }

    pub fn next_id(&self, kind: IdKind) -> Result<i64, OrderError> {
        Ok(self.storage.next_id(self.txn, kind)?)
    }

    // ========== Orders ==========

    pub fn load_order(&self, order_id: i64) -> Result<Order, OrderError> {
        self.storage
            .get_order_txn(self.txn, order_id)?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    /// Load the order owning a line item
    pub fn load_order_for_item(&self, item_id: i64) -> Result<Order, OrderError> {
        let order_id = self
            .storage
            .order_id_for_item_txn(self.txn, item_id)?
            .ok_or(OrderError::ItemNotFound(item_id))?;
        let order = self.load_order(order_id)?;
        if order.item(item_id).is_none() {
            return Err(OrderError::ItemNotFound(item_id));
        }
        Ok(order)
    }

    pub fn save_order(&self, order: &Order) -> Result<(), OrderError> {
        Ok(self.storage.put_order(self.txn, order)?)
    }

    pub fn unindex_item(&self, item_id: i64) -> Result<(), OrderError> {
        Ok(self.storage.unindex_item(self.txn, item_id)?)
    }

    pub fn delete_order(&self, order: &Order) -> Result<(), OrderError> {
        Ok(self.storage.remove_order(self.txn, order)?)
    }

    // ========== Catalog ==========

    pub fn load_product(&self, product_id: i64) -> Result<Product, OrderError> {
        self.storage
            .get_product_txn(self.txn, product_id)?
            .ok_or(OrderError::ProductNotFound(product_id))
    }

    pub fn save_product(&self, product: &Product) -> Result<(), OrderError> {
        Ok(self.storage.put_product(self.txn, product)?)
    }

    pub fn load_table(&self, table_id: i64) -> Result<DiningTable, OrderError> {
        self.storage
            .get_table_txn(self.txn, table_id)?
            .ok_or(OrderError::TableNotFound(table_id))
    }

    pub fn save_table(&self, table: &DiningTable) -> Result<(), OrderError> {
        Ok(self.storage.put_table(self.txn, table)?)
    }

    /// Mark a physical table OCCUPIED. Virtual tables stay FREE.
    pub fn occupy_table(&self, table: &mut DiningTable) -> Result<bool, OrderError> {
        if table.is_virtual() {
            return Ok(false);
        }
        table.status = TableStatus::Occupied;
        self.save_table(table)?;
        Ok(true)
    }

    /// Free the physical table of `order`, returning whether its state changed
    ///
    /// The table stays OCCUPIED while another active order sits on it.
    pub fn release_table(&self, order: &Order) -> Result<bool, OrderError> {
        let table_id = order.table_id;
        let Some(mut table) = self.storage.get_table_txn(self.txn, table_id)? else {
            tracing::warn!(table_id, "Order references a missing table");
            return Ok(false);
        };
        if table.is_virtual() || table.is_free() {
            return Ok(false);
        }
        if self
            .storage
            .table_has_active_order_txn(self.txn, table_id, order.id)?
        {
            tracing::debug!(table_id, order_id = order.id, "Table kept: another order is open");
            return Ok(false);
        }
        table.status = TableStatus::Free;
        self.save_table(&table)?;
        Ok(true)
    }

    // ========== Invoices ==========

    pub fn load_invoice(&self, invoice_id: i64) -> Result<Invoice, OrderError> {
        self.storage
            .get_invoice_txn(self.txn, invoice_id)?
            .ok_or(OrderError::InvoiceNotFound(invoice_id))
    }

    pub fn invoice_for_order(&self, order_id: i64) -> Result<Option<Invoice>, OrderError> {
        Ok(self.storage.invoice_for_order_txn(self.txn, order_id)?)
    }

    pub fn save_invoice(&self, invoice: &Invoice) -> Result<(), OrderError> {
        Ok(self.storage.put_invoice(self.txn, invoice)?)
    }

    pub fn delete_invoice(&self, invoice: &Invoice) -> Result<(), OrderError> {
        Ok(self.storage.remove_invoice(self.txn, invoice)?)
    }

    // ========== Events ==========

    /// Stage an event for the audit log
    pub fn emit(&mut self, order_id: i64, payload: EventPayload) {
        self.staged.push(StagedEvent { order_id, payload });
    }

    /// Assign sequence numbers, append staged events to the audit log and
    /// bump the version of every channel they touch
    pub fn flush_events(&mut self, metadata: &CommandMetadata) -> Result<FlushedEvents, StorageError> {
        let mut channels = BTreeSet::new();
        let mut events = Vec::with_capacity(self.staged.len());

        for staged in self.staged.drain(..) {
            let sequence = self.storage.increment_sequence(self.txn)?;
            let event_type = staged.payload.event_type();
            channels.extend(event_type.channels().iter().copied());
            let event = OrderEvent {
                event_id: uuid::Uuid::new_v4().to_string(),
                sequence,
                order_id: staged.order_id,
                timestamp: self.now,
                operator_id: metadata.operator_id,
                operator_name: metadata.operator_name.clone(),
                command_id: metadata.command_id.clone(),
                event_type,
                payload: staged.payload,
            };
            self.storage.store_event(self.txn, &event)?;
            events.push(event);
        }

        let mut versions = Vec::with_capacity(channels.len());
        for channel in channels {
            versions.push((channel, self.storage.bump_version(self.txn, channel)?));
        }

        Ok(FlushedEvents { events, versions })
    }
}

/// Command handler trait
///
/// Handlers validate first and only then mutate through the context.
pub trait CommandHandler {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError>;
}
