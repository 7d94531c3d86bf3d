//! redb-based storage layer for the order engine
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `products` | `product_id` | `Product` | Catalog with stock levels |
//! | `dining_tables` | `table_id` | `DiningTable` | Table registry and occupancy |
//! | `orders` | `order_id` | `Order` | Order aggregate (order + line items) |
//! | `active_orders` | `order_id` | `()` | Orders not yet served |
//! | `item_index` | `item_id` | `order_id` | Line item lookup |
//! | `invoices` | `invoice_id` | `Invoice` | Invoices |
//! | `order_invoice` | `order_id` | `invoice_id` | One invoice per order |
//! | `events` | `(order_id, sequence)` | `OrderEvent` | Audit log (append-only) |
//! | `processed_commands_at` | `command_id` | processed-at millis | Idempotency check, pruned by age |
//! | `sequence_counter` | `&str` | `u64` | Event sequence, id counters, channel versions |
//!
//! Every mutation of a command runs inside one `WriteTransaction`. redb
//! allows a single writer at a time, so read-modify-write of a product's
//! stock is serialized without extra locking.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use shared::SyncChannel;
use shared::models::{DiningTable, Invoice, Product};
use shared::order::{Order, OrderEvent};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Catalog: key = product_id, value = JSON-serialized Product
const PRODUCTS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("products");

/// Table registry: key = table_id, value = JSON-serialized DiningTable
const DINING_TABLES_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("dining_tables");

/// Orders: key = order_id, value = JSON-serialized Order (items embedded)
const ORDERS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("orders");

/// Active (not served) orders: key = order_id, value = empty (existence check)
const ACTIVE_ORDERS_TABLE: TableDefinition<i64, ()> = TableDefinition::new("active_orders");

/// Line item index: key = item_id, value = order_id
const ITEM_INDEX_TABLE: TableDefinition<i64, i64> = TableDefinition::new("item_index");

/// Invoices: key = invoice_id, value = JSON-serialized Invoice
const INVOICES_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("invoices");

/// Invoice per order: key = order_id, value = invoice_id
const ORDER_INVOICE_TABLE: TableDefinition<i64, i64> = TableDefinition::new("order_invoice");

/// Audit log: key = (order_id, sequence), value = JSON-serialized OrderEvent
const EVENTS_TABLE: TableDefinition<(i64, u64), &[u8]> = TableDefinition::new("events");

/// Processed commands: key = command_id, value = empty (idempotency)
const PROCESSED_COMMANDS_TABLE: TableDefinition<&str, i64> =
    TableDefinition::new("processed_commands_at");

/// Counters: key = counter name, value = u64
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

const SEQUENCE_KEY: &str = "seq";

/// Id counters kept in the sequence table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Order,
    LineItem,
    Invoice,
}

impl IdKind {
    fn key(&self) -> &'static str {
        match self {
            IdKind::Order => "order_id",
            IdKind::LineItem => "item_id",
            IdKind::Invoice => "invoice_id",
        }
    }
}

fn version_key(channel: SyncChannel) -> &'static str {
    match channel {
        SyncChannel::Kitchen => "version:kitchen",
        SyncChannel::Stock => "version:stock",
    }
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Engine storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl OrderStorage {
    /// Open or create the database at the given path
    ///
    /// redb commits with `Durability::Immediate` by default: once `commit()`
    /// returns the data is on disk, and the file stays consistent across
    /// power loss (copy-on-write with atomic root swap).
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init_tables(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init_tables(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    fn init_tables(db: &Database) -> StorageResult<()> {
        let write_txn = db.begin_write()?;
        {
            // Create all tables if they don't exist
            let _ = write_txn.open_table(PRODUCTS_TABLE)?;
            let _ = write_txn.open_table(DINING_TABLES_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(ACTIVE_ORDERS_TABLE)?;
            let _ = write_txn.open_table(ITEM_INDEX_TABLE)?;
            let _ = write_txn.open_table(INVOICES_TABLE)?;
            let _ = write_txn.open_table(ORDER_INVOICE_TABLE)?;
            let _ = write_txn.open_table(EVENTS_TABLE)?;
            let _ = write_txn.open_table(PROCESSED_COMMANDS_TABLE)?;

            // Initialize sequence counter if not exists
            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(SEQUENCE_KEY)?.is_none() {
                seq_table.insert(SEQUENCE_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Counters ==========

    fn read_counter(&self, key: &str) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEQUENCE_TABLE)?;
        Ok(table.get(key)?.map(|guard| guard.value()).unwrap_or(0))
    }

    fn increment_counter_txn(&self, txn: &WriteTransaction, key: &str) -> StorageResult<u64> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table.get(key)?.map(|guard| guard.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(key, next)?;
        Ok(next)
    }

    /// Increment and return the audit sequence number
    pub fn increment_sequence(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        self.increment_counter_txn(txn, SEQUENCE_KEY)
    }

    /// Get current audit sequence (read-only)
    pub fn get_current_sequence(&self) -> StorageResult<u64> {
        self.read_counter(SEQUENCE_KEY)
    }

    /// Allocate the next id of the given kind (ids start at 1)
    pub fn next_id(&self, txn: &WriteTransaction, kind: IdKind) -> StorageResult<i64> {
        Ok(self.increment_counter_txn(txn, kind.key())? as i64)
    }

    /// Bump a channel version inside the mutation's transaction
    pub fn bump_version(&self, txn: &WriteTransaction, channel: SyncChannel) -> StorageResult<u64> {
        self.increment_counter_txn(txn, version_key(channel))
    }

    /// Committed channel version
    pub fn get_version(&self, channel: SyncChannel) -> StorageResult<u64> {
        self.read_counter(version_key(channel))
    }

    // ========== Command Idempotency ==========

    /// Check if a command has been processed
    pub fn is_command_processed(&self, command_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Check if a command has been processed (within transaction)
    pub fn is_command_processed_txn(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<bool> {
        let table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Mark a command as processed at `processed_at` (millis)
    pub fn mark_command_processed(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
        processed_at: i64,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        table.insert(command_id, processed_at)?;
        Ok(())
    }

    /// Forget command ids processed before `cutoff` (millis)
    ///
    /// A retry of a pruned id executes again, so the cutoff must lie well
    /// beyond any client retry window.
    pub fn prune_processed_commands(&self, cutoff: i64) -> StorageResult<u64> {
        let txn = self.begin_write()?;
        let removed = {
            let mut table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
            let before = table.len()?;
            table.retain(|_, processed_at| processed_at >= cutoff)?;
            before - table.len()?
        };
        txn.commit()?;
        Ok(removed)
    }

    // ========== Event Operations ==========

    /// Append an event to the audit log
    pub fn store_event(&self, txn: &WriteTransaction, event: &OrderEvent) -> StorageResult<()> {
        let mut table = txn.open_table(EVENTS_TABLE)?;
        let value = serde_json::to_vec(event)?;
        table.insert((event.order_id, event.sequence), value.as_slice())?;
        Ok(())
    }

    /// Get all events for an order, in sequence order
    pub fn get_events_for_order(&self, order_id: i64) -> StorageResult<Vec<OrderEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENTS_TABLE)?;

        let mut events = Vec::new();
        for result in table.range((order_id, 0u64)..=(order_id, u64::MAX))? {
            let (_key, value) = result?;
            events.push(serde_json::from_slice(value.value())?);
        }
        Ok(events)
    }

    // ========== Products ==========

    pub fn put_product(&self, txn: &WriteTransaction, product: &Product) -> StorageResult<()> {
        let mut table = txn.open_table(PRODUCTS_TABLE)?;
        let value = serde_json::to_vec(product)?;
        table.insert(product.id, value.as_slice())?;
        Ok(())
    }

    pub fn get_product_txn(
        &self,
        txn: &WriteTransaction,
        product_id: i64,
    ) -> StorageResult<Option<Product>> {
        let table = txn.open_table(PRODUCTS_TABLE)?;
        match table.get(product_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_product(&self, product_id: i64) -> StorageResult<Option<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;
        match table.get(product_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All products ordered by id
    pub fn list_products(&self) -> StorageResult<Vec<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;

        let mut products = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            products.push(serde_json::from_slice(value.value())?);
        }
        Ok(products)
    }

    // ========== Dining Tables ==========

    pub fn put_table(&self, txn: &WriteTransaction, table: &DiningTable) -> StorageResult<()> {
        let mut t = txn.open_table(DINING_TABLES_TABLE)?;
        let value = serde_json::to_vec(table)?;
        t.insert(table.id, value.as_slice())?;
        Ok(())
    }

    pub fn get_table_txn(
        &self,
        txn: &WriteTransaction,
        table_id: i64,
    ) -> StorageResult<Option<DiningTable>> {
        let t = txn.open_table(DINING_TABLES_TABLE)?;
        match t.get(table_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_table(&self, table_id: i64) -> StorageResult<Option<DiningTable>> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(DINING_TABLES_TABLE)?;
        match t.get(table_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All tables ordered by id
    pub fn list_tables(&self) -> StorageResult<Vec<DiningTable>> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(DINING_TABLES_TABLE)?;

        let mut tables = Vec::new();
        for result in t.iter()? {
            let (_key, value) = result?;
            tables.push(serde_json::from_slice(value.value())?);
        }
        Ok(tables)
    }

    // ========== Orders ==========

    /// Store an order, keeping the active and item indexes in step
    pub fn put_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            let value = serde_json::to_vec(order)?;
            table.insert(order.id, value.as_slice())?;
        }
        {
            let mut active = txn.open_table(ACTIVE_ORDERS_TABLE)?;
            if order.status.is_active() {
                active.insert(order.id, ())?;
            } else {
                active.remove(order.id)?;
            }
        }
        let mut index = txn.open_table(ITEM_INDEX_TABLE)?;
        for item in &order.items {
            index.insert(item.id, order.id)?;
        }
        Ok(())
    }

    /// Drop a line item from the item index
    pub fn unindex_item(&self, txn: &WriteTransaction, item_id: i64) -> StorageResult<()> {
        let mut index = txn.open_table(ITEM_INDEX_TABLE)?;
        index.remove(item_id)?;
        Ok(())
    }

    /// Delete an order together with its item index entries
    pub fn remove_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        {
            let mut table = txn.open_table(ORDERS_TABLE)?;
            table.remove(order.id)?;
        }
        {
            let mut active = txn.open_table(ACTIVE_ORDERS_TABLE)?;
            active.remove(order.id)?;
        }
        let mut index = txn.open_table(ITEM_INDEX_TABLE)?;
        for item in &order.items {
            index.remove(item.id)?;
        }
        Ok(())
    }

    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: i64,
    ) -> StorageResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_order(&self, order_id: i64) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Resolve the owning order of a line item (within transaction)
    pub fn order_id_for_item_txn(
        &self,
        txn: &WriteTransaction,
        item_id: i64,
    ) -> StorageResult<Option<i64>> {
        let index = txn.open_table(ITEM_INDEX_TABLE)?;
        Ok(index.get(item_id)?.map(|guard| guard.value()))
    }

    /// Active orders ordered by id (creation order)
    ///
    /// Records that fail to decode are logged and skipped so that one bad row
    /// cannot take down kitchen dashboards.
    pub fn get_active_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let active = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let orders_table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in active.iter()? {
            let (key, _) = result?;
            let order_id = key.value();
            let Some(value) = orders_table.get(order_id)? else {
                tracing::warn!(order_id, "Active index points at a missing order");
                continue;
            };
            match serde_json::from_slice::<Order>(value.value()) {
                Ok(order) => orders.push(order),
                Err(e) => {
                    tracing::warn!(order_id, error = %e, "Skipping undecodable order record");
                }
            }
        }
        Ok(orders)
    }

    /// Whether an active order other than `except_order_id` sits on a table
    /// (within transaction)
    pub fn table_has_active_order_txn(
        &self,
        txn: &WriteTransaction,
        table_id: i64,
        except_order_id: i64,
    ) -> StorageResult<bool> {
        let active = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let orders_table = txn.open_table(ORDERS_TABLE)?;
        for result in active.iter()? {
            let (key, _) = result?;
            let order_id = key.value();
            if order_id == except_order_id {
                continue;
            }
            let Some(value) = orders_table.get(order_id)? else {
                continue;
            };
            let order: Order = serde_json::from_slice(value.value())?;
            if order.table_id == table_id {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// All orders ordered by id
    pub fn list_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            orders.push(serde_json::from_slice(value.value())?);
        }
        Ok(orders)
    }

    // ========== Invoices ==========

    /// Store an invoice and its order link
    pub fn put_invoice(&self, txn: &WriteTransaction, invoice: &Invoice) -> StorageResult<()> {
        {
            let mut table = txn.open_table(INVOICES_TABLE)?;
            let value = serde_json::to_vec(invoice)?;
            table.insert(invoice.id, value.as_slice())?;
        }
        let mut link = txn.open_table(ORDER_INVOICE_TABLE)?;
        link.insert(invoice.order_id, invoice.id)?;
        Ok(())
    }

    pub fn remove_invoice(&self, txn: &WriteTransaction, invoice: &Invoice) -> StorageResult<()> {
        {
            let mut table = txn.open_table(INVOICES_TABLE)?;
            table.remove(invoice.id)?;
        }
        let mut link = txn.open_table(ORDER_INVOICE_TABLE)?;
        link.remove(invoice.order_id)?;
        Ok(())
    }

    pub fn get_invoice_txn(
        &self,
        txn: &WriteTransaction,
        invoice_id: i64,
    ) -> StorageResult<Option<Invoice>> {
        let table = txn.open_table(INVOICES_TABLE)?;
        match table.get(invoice_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_invoice(&self, invoice_id: i64) -> StorageResult<Option<Invoice>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(INVOICES_TABLE)?;
        match table.get(invoice_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// The invoice of an order, if any (within transaction)
    pub fn invoice_for_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: i64,
    ) -> StorageResult<Option<Invoice>> {
        let invoice_id = {
            let link = txn.open_table(ORDER_INVOICE_TABLE)?;
            link.get(order_id)?.map(|guard| guard.value())
        };
        match invoice_id {
            Some(id) => self.get_invoice_txn(txn, id),
            None => Ok(None),
        }
    }

    /// The invoice of an order, if any
    pub fn invoice_for_order(&self, order_id: i64) -> StorageResult<Option<Invoice>> {
        let read_txn = self.db.begin_read()?;
        let link = read_txn.open_table(ORDER_INVOICE_TABLE)?;
        let Some(invoice_id) = link.get(order_id)?.map(|guard| guard.value()) else {
            return Ok(None);
        };
        let table = read_txn.open_table(INVOICES_TABLE)?;
        match table.get(invoice_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All invoices ordered by id
    pub fn list_invoices(&self) -> StorageResult<Vec<Invoice>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(INVOICES_TABLE)?;

        let mut invoices = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            invoices.push(serde_json::from_slice(value.value())?);
        }
        Ok(invoices)
    }

    // ========== Stats ==========

    /// Get storage statistics
    pub fn get_stats(&self) -> StorageResult<StorageStats> {
        let read_txn = self.db.begin_read()?;

        let products = read_txn.open_table(PRODUCTS_TABLE)?;
        let orders = read_txn.open_table(ORDERS_TABLE)?;
        let active = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let invoices = read_txn.open_table(INVOICES_TABLE)?;
        let events = read_txn.open_table(EVENTS_TABLE)?;
        let commands = read_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        let seq_table = read_txn.open_table(SEQUENCE_TABLE)?;

        Ok(StorageStats {
            product_count: products.len()?,
            order_count: orders.len()?,
            active_order_count: active.len()?,
            invoice_count: invoices.len()?,
            event_count: events.len()?,
            processed_command_count: commands.len()?,
            current_sequence: seq_table
                .get(SEQUENCE_KEY)?
                .map(|guard| guard.value())
                .unwrap_or(0),
        })
    }
}

/// Storage statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct StorageStats {
    pub product_count: u64,
    pub order_count: u64,
    pub active_order_count: u64,
    pub invoice_count: u64,
    pub event_count: u64,
    pub processed_command_count: u64,
    pub current_sequence: u64,
}
