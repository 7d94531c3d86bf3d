//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles
//! one specific command type.

use rust_decimal::Decimal;

use crate::inventory::ReservationPlan;
use crate::invoicing;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::orders::storage::IdKind;
use shared::models::Invoice;
use shared::order::{
    CommandOutcome, EventPayload, ItemOrigin, ItemStatus, LineItem, Order, OrderCommandPayload,
    OrderItemInput,
};

mod add_items;
mod adjust_stock;
mod complete_order;
mod create_invoice;
mod create_order;
mod decrement_item;
mod mark_item_ready;
mod pay_invoice;
mod refund_invoice;
mod remove_item;
mod serve_order;

pub use add_items::AddItemsAction;
pub use adjust_stock::AdjustStockAction;
pub use complete_order::CompleteOrderAction;
pub use create_invoice::CreateInvoiceAction;
pub use create_order::CreateOrderAction;
pub use decrement_item::DecrementItemAction;
pub use mark_item_ready::MarkItemReadyAction;
pub use pay_invoice::PayInvoiceAction;
pub use refund_invoice::RefundInvoiceAction;
pub use remove_item::RemoveItemAction;
pub use serve_order::ServeOrderAction;

use super::manager::EngineRules;

/// CommandAction enum - dispatches to concrete action implementations
pub enum CommandAction {
    CreateOrder(CreateOrderAction),
    AddItems(AddItemsAction),
    MarkItemReady(MarkItemReadyAction),
    DecrementItem(DecrementItemAction),
    RemoveItem(RemoveItemAction),
    CompleteOrder(CompleteOrderAction),
    ServeOrder(ServeOrderAction),
    CreateInvoice(CreateInvoiceAction),
    PayInvoice(PayInvoiceAction),
    RefundInvoice(RefundInvoiceAction),
    AdjustStock(AdjustStockAction),
}

impl CommandHandler for CommandAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        match self {
            CommandAction::CreateOrder(action) => action.execute(ctx, metadata),
            CommandAction::AddItems(action) => action.execute(ctx, metadata),
            CommandAction::MarkItemReady(action) => action.execute(ctx, metadata),
            CommandAction::DecrementItem(action) => action.execute(ctx, metadata),
            CommandAction::RemoveItem(action) => action.execute(ctx, metadata),
            CommandAction::CompleteOrder(action) => action.execute(ctx, metadata),
            CommandAction::ServeOrder(action) => action.execute(ctx, metadata),
            CommandAction::CreateInvoice(action) => action.execute(ctx, metadata),
            CommandAction::PayInvoice(action) => action.execute(ctx, metadata),
            CommandAction::RefundInvoice(action) => action.execute(ctx, metadata),
            CommandAction::AdjustStock(action) => action.execute(ctx, metadata),
        }
    }
}

impl CommandAction {
    /// Convert a command payload to its action
    ///
    /// This is the ONLY place with a match on OrderCommandPayload. Engine
    /// rules (tax rate) are injected here.
    pub fn new(payload: &OrderCommandPayload, rules: &EngineRules) -> Self {
        match payload {
            OrderCommandPayload::CreateOrder {
                table_id,
                items,
                note,
            } => CommandAction::CreateOrder(CreateOrderAction {
                table_id: *table_id,
                items: items.clone(),
                note: note.clone(),
            }),
            OrderCommandPayload::AddItems { order_id, items } => {
                CommandAction::AddItems(AddItemsAction {
                    order_id: *order_id,
                    items: items.clone(),
                })
            }
            OrderCommandPayload::MarkItemReady { item_id } => {
                CommandAction::MarkItemReady(MarkItemReadyAction { item_id: *item_id })
            }
            OrderCommandPayload::DecrementItem { item_id } => {
                CommandAction::DecrementItem(DecrementItemAction { item_id: *item_id })
            }
            OrderCommandPayload::RemoveItem { item_id } => {
                CommandAction::RemoveItem(RemoveItemAction { item_id: *item_id })
            }
            OrderCommandPayload::CompleteOrder { order_id } => {
                CommandAction::CompleteOrder(CompleteOrderAction {
                    order_id: *order_id,
                })
            }
            OrderCommandPayload::ServeOrder { order_id } => {
                CommandAction::ServeOrder(ServeOrderAction {
                    order_id: *order_id,
                })
            }
            OrderCommandPayload::CreateInvoice {
                order_id,
                discount_percent,
                apply_tax,
                customer,
            } => CommandAction::CreateInvoice(CreateInvoiceAction {
                order_id: *order_id,
                discount_percent: *discount_percent,
                tax_rate: if *apply_tax {
                    rules.tax_rate
                } else {
                    Decimal::ZERO
                },
                customer: customer.clone(),
            }),
            OrderCommandPayload::PayInvoice {
                invoice_id,
                method,
                amount,
                note,
            } => CommandAction::PayInvoice(PayInvoiceAction {
                invoice_id: *invoice_id,
                method: *method,
                amount: *amount,
                note: note.clone(),
            }),
            OrderCommandPayload::RefundInvoice {
                invoice_id,
                reason,
                amount,
            } => CommandAction::RefundInvoice(RefundInvoiceAction {
                invoice_id: *invoice_id,
                reason: reason.clone(),
                amount: *amount,
            }),
            OrderCommandPayload::AdjustStock {
                product_id,
                delta,
                reason,
            } => CommandAction::AdjustStock(AdjustStockAction {
                product_id: *product_id,
                delta: *delta,
                reason: reason.clone(),
            }),
        }
    }
}

// ========== Shared helpers ==========

/// Build line items for validated input lines, capturing name and price
/// from the catalog rows read by the reservation plan
fn build_line_items(
    ctx: &CommandContext<'_>,
    plan: &ReservationPlan,
    order_id: i64,
    items: &[OrderItemInput],
    origin: ItemOrigin,
) -> Result<Vec<LineItem>, OrderError> {
    let now = ctx.now();
    let mut lines = Vec::with_capacity(items.len());
    for input in items {
        let product = plan
            .product(input.product_id)
            .ok_or(OrderError::ProductNotFound(input.product_id))?;
        lines.push(LineItem {
            id: ctx.next_id(IdKind::LineItem)?,
            order_id,
            product_id: product.id,
            product_name: product.name.clone(),
            quantity: input.quantity,
            unit_price: product.price,
            status: ItemStatus::Pending,
            origin,
            note: input.note.clone(),
            created_at: now,
            ready_at: None,
        });
    }
    Ok(lines)
}

/// Keep an UNPAID / PARTIAL invoice in step with the order's line items
fn sync_pending_invoice(
    ctx: &mut CommandContext<'_>,
    order: &Order,
) -> Result<Option<Invoice>, OrderError> {
    let Some(mut invoice) = ctx.invoice_for_order(order.id)? else {
        return Ok(None);
    };
    if !invoice.payment_status.is_pending() {
        return Ok(None);
    }
    invoicing::apply_subtotal(&mut invoice, order.items_total(), ctx.now());
    ctx.save_invoice(&invoice)?;
    ctx.emit(
        order.id,
        EventPayload::InvoiceUpdated {
            invoice_id: invoice.id,
            subtotal: invoice.subtotal,
            total: invoice.total,
        },
    );
    Ok(Some(invoice))
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by the action tests

    use super::*;
    use crate::orders::storage::OrderStorage;
    use shared::models::{DiningTable, Product, TableStatus};
    use shared::order::OrderStatus;

    pub fn metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".to_string(),
            operator_id: 1,
            operator_name: "Test User".to_string(),
            timestamp: 1234567890,
        }
    }

    pub fn product(id: i64, name: &str, cents: i64, stock: u32) -> Product {
        Product {
            id,
            name: name.to_string(),
            price: Decimal::new(cents, 2),
            stock,
            category: None,
            is_active: true,
            is_available: true,
            updated_at: 0,
        }
    }

    pub fn table(id: i64, number: u32) -> DiningTable {
        DiningTable {
            id,
            number,
            capacity: 4,
            status: TableStatus::Free,
            is_active: true,
        }
    }

    /// Storage with Soup (id 1, 5.00, stock 10), Bread (id 2, 1.50, stock 3),
    /// physical table 3 (id 3) and the to-go table (id 50)
    pub fn seeded_storage() -> OrderStorage {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.put_product(&txn, &product(1, "Soup", 500, 10)).unwrap();
        storage.put_product(&txn, &product(2, "Bread", 150, 3)).unwrap();
        storage.put_table(&txn, &table(3, 3)).unwrap();
        storage.put_table(&txn, &table(50, 50)).unwrap();
        txn.commit().unwrap();
        storage
    }

    /// Create an order through the action and commit it
    pub fn open_order(storage: &OrderStorage, table_id: i64, items: Vec<OrderItemInput>) -> Order {
        let txn = storage.begin_write().unwrap();
        let order_id = {
            let mut ctx = CommandContext::new(&txn, storage, 1_000);
            let action = CreateOrderAction {
                table_id,
                items,
                note: None,
            };
            match action.execute(&mut ctx, &metadata()).unwrap() {
                CommandOutcome::OrderCreated { order_id, .. } => order_id,
                other => panic!("unexpected outcome: {:?}", other),
            }
        };
        txn.commit().unwrap();
        storage.get_order(order_id).unwrap().unwrap()
    }

    /// Run one action in its own committed transaction
    pub fn run<A: CommandHandler>(
        storage: &OrderStorage,
        action: &A,
    ) -> Result<CommandOutcome, OrderError> {
        let txn = storage.begin_write().unwrap();
        let result = {
            let mut ctx = CommandContext::new(&txn, storage, 2_000);
            action.execute(&mut ctx, &metadata())
        };
        if result.is_ok() {
            txn.commit().unwrap();
        }
        result
    }

    pub fn status_of(storage: &OrderStorage, order_id: i64) -> OrderStatus {
        storage.get_order(order_id).unwrap().unwrap().status
    }
}
