//! OrdersManager - Core command processing and event generation
//!
//! This module handles:
//! - Command validation and processing
//! - Event generation with global sequence numbers
//! - Persistence to redb (transactional)
//! - Channel version signaling for long-poll clients
//! - Event broadcasting
//!
//! # Command Flow
//!
//! ```text
//! execute_command(cmd)
//!     ├─ 1. Idempotency check (command_id)
//!     ├─ 2. Begin write transaction
//!     ├─ 3. Create CommandContext
//!     ├─ 4. Convert command to action and execute
//!     ├─ 5. Append events, bump channel versions (same transaction)
//!     ├─ 6. Mark command processed
//!     ├─ 7. Commit transaction
//!     ├─ 8. Publish channel versions, broadcast event(s)
//!     └─ 9. Return response
//! ```

mod error;
pub use error::*;

use super::actions::CommandAction;
use super::storage::{OrderStorage, StorageStats};
use super::traits::{CommandContext, CommandHandler, CommandMetadata};
use super::views;
use rust_decimal::Decimal;
use shared::SyncChannel;
use shared::models::{DiningTable, Invoice, Product};
use shared::order::{
    CommandResponse, InvoiceDetail, KitchenBoard, Order, OrderCommand, OrderDetail, OrderEvent, OrderStatus,
    OrderSummary, PriorityBuckets, StockBoard,
};
use std::collections::HashSet;
use std::path::Path;
use tokio::sync::{broadcast, watch};

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Business rules applied by actions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineRules {
    /// Tax rate as a fraction (0.19 = 19%), applied by explicit invoice creation
    pub tax_rate: Decimal,
}

impl Default for EngineRules {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(19, 2),
        }
    }
}

/// In-process version signals, one per audience channel
struct ChannelSignals {
    kitchen: watch::Sender<u64>,
    stock: watch::Sender<u64>,
}

impl ChannelSignals {
    fn sender(&self, channel: SyncChannel) -> &watch::Sender<u64> {
        match channel {
            SyncChannel::Kitchen => &self.kitchen,
            SyncChannel::Stock => &self.stock,
        }
    }
}

/// OrdersManager for command processing
///
/// The `epoch` field is a unique identifier generated on each startup.
/// Clients use it to detect server restarts.
pub struct OrdersManager {
    storage: OrderStorage,
    rules: EngineRules,
    event_tx: broadcast::Sender<OrderEvent>,
    signals: ChannelSignals,
    /// Server instance epoch - unique ID generated on startup
    epoch: String,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("rules", &self.rules)
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl OrdersManager {
    /// Open the database at `db_path` and create a manager
    pub fn new(db_path: impl AsRef<Path>, rules: EngineRules) -> ManagerResult<Self> {
        let storage = OrderStorage::open(db_path)?;
        Self::with_storage(storage).map(|m| m.with_rules(rules))
    }

    /// Create a manager over existing storage (default rules)
    ///
    /// Version signals are seeded from the persisted channel versions.
    pub fn with_storage(storage: OrderStorage) -> ManagerResult<Self> {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let signals = ChannelSignals {
            kitchen: watch::Sender::new(storage.get_version(SyncChannel::Kitchen)?),
            stock: watch::Sender::new(storage.get_version(SyncChannel::Stock)?),
        };
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, "OrdersManager started");
        Ok(Self {
            storage,
            rules: EngineRules::default(),
            event_tx,
            signals,
            epoch,
        })
    }

    pub fn with_rules(mut self, rules: EngineRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &EngineRules {
        &self.rules
    }

    /// Get the server epoch (unique instance ID)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// Subscribe to committed events
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.event_tx.subscribe()
    }

    /// Watch a channel's version; it changes after every commit that
    /// touches the channel
    pub fn watch_channel(&self, channel: SyncChannel) -> watch::Receiver<u64> {
        self.signals.sender(channel).subscribe()
    }

    /// Latest committed version of a channel
    pub fn channel_version(&self, channel: SyncChannel) -> u64 {
        *self.signals.sender(channel).borrow()
    }

    /// Get the storage reference
    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    /// Execute a command and return the response
    pub fn execute_command(&self, cmd: OrderCommand) -> CommandResponse {
        let command_id = cmd.command_id.clone();
        match self.process_command(cmd) {
            Ok((response, events)) => {
                // Broadcast events after successful commit
                for event in events {
                    if self.event_tx.send(event).is_err() {
                        tracing::trace!("Event broadcast skipped: no active receivers");
                        break;
                    }
                }
                response
            }
            Err(err) => {
                if let ManagerError::Rejected(e) = &err {
                    tracing::warn!(command_id = %command_id, code = ?e.code(), "Command rejected: {}", e);
                }
                CommandResponse::error(command_id, err.into())
            }
        }
    }

    /// Process command and return response with events
    fn process_command(
        &self,
        cmd: OrderCommand,
    ) -> ManagerResult<(CommandResponse, Vec<OrderEvent>)> {
        let action_name = cmd.payload.action_name();
        tracing::info!(command_id = %cmd.command_id, action = action_name, operator_id = cmd.operator_id, "Processing command");
        tracing::debug!(command_id = %cmd.command_id, payload = ?cmd.payload, "Command payload");

        // 1. Idempotency check (before transaction)
        if self.storage.is_command_processed(&cmd.command_id)? {
            tracing::warn!(command_id = %cmd.command_id, "Duplicate command");
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        // 2. Begin write transaction
        let txn = self.storage.begin_write()?;

        // Double-check idempotency within transaction
        if self
            .storage
            .is_command_processed_txn(&txn, &cmd.command_id)?
        {
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        // 3. Create context and metadata
        let metadata = CommandMetadata {
            command_id: cmd.command_id.clone(),
            operator_id: cmd.operator_id,
            operator_name: cmd.operator_name.clone(),
            timestamp: cmd.timestamp,
        };
        let now = shared::util::now_millis();
        let mut ctx = CommandContext::new(&txn, &self.storage, now);

        // 4. Convert to action and execute
        let action = CommandAction::new(&cmd.payload, &self.rules);
        let outcome = action.execute(&mut ctx, &metadata)?;

        // 5. Persist events and bump channel versions
        let flushed = ctx.flush_events(&metadata)?;

        // 6. Mark command processed
        self.storage
            .mark_command_processed(&txn, &cmd.command_id, now)?;

        // 7. Commit
        txn.commit().map_err(super::storage::StorageError::from)?;

        // 8. Publish versions to long-poll waiters
        for (channel, version) in &flushed.versions {
            self.signals.sender(*channel).send_replace(*version);
        }

        tracing::info!(
            command_id = %cmd.command_id,
            action = action_name,
            events = flushed.events.len(),
            "Command committed"
        );

        Ok((
            CommandResponse::success(cmd.command_id, outcome),
            flushed.events,
        ))
    }

    // ========== Queries ==========

    pub fn get_order(&self, order_id: i64) -> ManagerResult<Option<Order>> {
        Ok(self.storage.get_order(order_id)?)
    }

    /// Order with its invoice, original vs added items
    pub fn order_detail(&self, order_id: i64) -> ManagerResult<Option<OrderDetail>> {
        let Some(order) = self.storage.get_order(order_id)? else {
            return Ok(None);
        };
        let invoice = self.storage.invoice_for_order(order_id)?;
        Ok(Some(views::order_detail(order, invoice)))
    }

    /// Orders not yet served, ordered by id
    pub fn get_active_orders(&self) -> ManagerResult<Vec<Order>> {
        Ok(self.storage.get_active_orders()?)
    }

    pub fn kitchen_board(&self) -> ManagerResult<KitchenBoard> {
        let orders = self.storage.get_active_orders()?;
        Ok(views::kitchen_board(&orders, shared::util::now_millis()))
    }

    pub fn pending_by_priority(&self) -> ManagerResult<PriorityBuckets> {
        let orders = self.storage.get_active_orders()?;
        Ok(views::pending_by_priority(&orders, shared::util::now_millis()))
    }

    pub fn stock_board(&self) -> ManagerResult<StockBoard> {
        let products = self.storage.list_products()?;
        let orders = self.storage.get_active_orders()?;
        Ok(views::stock_board(&products, &orders, shared::util::now_millis()))
    }

    /// Orders still open at a table: active ones plus served ones whose
    /// invoice is pending, newest first
    pub fn open_orders(&self, waiter_id: Option<i64>) -> ManagerResult<Vec<OrderSummary>> {
        let pending_invoice_orders: HashSet<i64> = self
            .storage
            .list_invoices()?
            .into_iter()
            .filter(|inv| inv.payment_status.is_pending())
            .map(|inv| inv.order_id)
            .collect();

        let mut orders = self.storage.get_active_orders()?;
        for order_id in &pending_invoice_orders {
            if let Some(order) = self.storage.get_order(*order_id)?
                && order.status == OrderStatus::Served
            {
                orders.push(order);
            }
        }

        let mut summaries: Vec<OrderSummary> = orders
            .iter()
            .filter(|o| waiter_id.is_none_or(|w| o.waiter_id == w))
            .map(|o| views::order_summary(o, pending_invoice_orders.contains(&o.id)))
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.order_id.cmp(&a.order_id)));
        Ok(summaries)
    }

    /// The order currently open on a table, if any
    pub fn order_for_table(&self, table_id: i64) -> ManagerResult<Option<OrderDetail>> {
        let active = self
            .storage
            .get_active_orders()?
            .into_iter()
            .filter(|o| o.table_id == table_id)
            .max_by_key(|o| o.id);
        if let Some(order) = active {
            let invoice = self.storage.invoice_for_order(order.id)?;
            return Ok(Some(views::order_detail(order, invoice)));
        }

        let mut candidates: Vec<(Order, Invoice)> = Vec::new();
        for invoice in self.storage.list_invoices()? {
            if !invoice.payment_status.is_pending() {
                continue;
            }
            if let Some(order) = self.storage.get_order(invoice.order_id)?
                && order.table_id == table_id
                && order.status == OrderStatus::Served
            {
                candidates.push((order, invoice));
            }
        }
        Ok(candidates
            .into_iter()
            .max_by_key(|(order, _)| order.id)
            .map(|(order, invoice)| views::order_detail(order, Some(invoice))))
    }

    pub fn tables(&self) -> ManagerResult<Vec<DiningTable>> {
        Ok(self.storage.list_tables()?)
    }

    pub fn products(&self) -> ManagerResult<Vec<Product>> {
        Ok(self.storage.list_products()?)
    }

    /// UNPAID and PARTIAL invoices, oldest first
    pub fn pending_invoices(&self) -> ManagerResult<Vec<Invoice>> {
        Ok(self
            .storage
            .list_invoices()?
            .into_iter()
            .filter(|inv| inv.payment_status.is_pending())
            .collect())
    }

    pub fn invoice_for_order(&self, order_id: i64) -> ManagerResult<Option<Invoice>> {
        Ok(self.storage.invoice_for_order(order_id)?)
    }

    /// Invoice by id together with its order
    pub fn invoice_detail(&self, invoice_id: i64) -> ManagerResult<Option<InvoiceDetail>> {
        let Some(invoice) = self.storage.get_invoice(invoice_id)? else {
            return Ok(None);
        };
        let Some(order) = self.storage.get_order(invoice.order_id)? else {
            tracing::warn!(invoice_id, order_id = invoice.order_id, "Invoice references a missing order");
            return Ok(None);
        };
        Ok(Some(InvoiceDetail {
            order: views::order_detail(order, None),
            invoice,
        }))
    }

    pub fn get_events_for_order(&self, order_id: i64) -> ManagerResult<Vec<OrderEvent>> {
        Ok(self.storage.get_events_for_order(order_id)?)
    }

    /// Forget processed command ids older than `retention`
    ///
    /// Returns how many ids were dropped.
    pub fn prune_processed_commands(&self, retention: std::time::Duration) -> ManagerResult<u64> {
        let cutoff = shared::util::now_millis() - retention.as_millis() as i64;
        let removed = self.storage.prune_processed_commands(cutoff)?;
        if removed > 0 {
            tracing::info!(removed, cutoff, "Pruned processed command ids");
        }
        Ok(removed)
    }

    /// Engine counters for the stats endpoint
    pub fn engine_stats(&self) -> ManagerResult<EngineStats> {
        let active = self.storage.get_active_orders()?;
        let products = self.storage.list_products()?;
        Ok(EngineStats {
            active_orders: active.len(),
            pending_items: active.iter().map(Order::pending_count).sum(),
            active_products: products.iter().filter(|p| p.is_active).count(),
            unpaid_invoices: self.pending_invoices()?.len(),
            kitchen_version: self.channel_version(SyncChannel::Kitchen),
            stock_version: self.channel_version(SyncChannel::Stock),
            storage: self.storage.get_stats()?,
        })
    }
}

/// Engine counters
#[derive(Debug, Clone, serde::Serialize)]
pub struct EngineStats {
    pub active_orders: usize,
    pub pending_items: usize,
    pub active_products: usize,
    pub unpaid_invoices: usize,
    pub kitchen_version: u64,
    pub stock_version: u64,
    pub storage: StorageStats,
}

#[cfg(test)]
mod tests;
