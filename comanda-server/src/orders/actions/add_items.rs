//! AddItems command handler
//!
//! Adds line items to an existing order. A READY order goes back to
//! IN_PROGRESS; a SERVED order may only be amended while its invoice is
//! UNPAID or PARTIAL, in which case the invoice grows by the added amount.

use crate::inventory::ReservationPlan;
use crate::invoicing;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use rust_decimal::Decimal;
use shared::models::PaymentStatus;
use shared::order::{
    AmendmentResult, CommandOutcome, EventPayload, ItemOrigin, LineItem, OrderItemInput,
    OrderStatus,
};

use super::build_line_items;

/// AddItems action
#[derive(Debug, Clone)]
pub struct AddItemsAction {
    pub order_id: i64,
    pub items: Vec<OrderItemInput>,
}

impl CommandHandler for AddItemsAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        // 1. Load order and its invoice
        let mut order = ctx.load_order(self.order_id)?;
        let invoice = ctx.invoice_for_order(order.id)?;

        // 2. Settled invoices close the order; a served order needs a pending invoice
        let pending_invoice = match invoice {
            Some(inv) if matches!(inv.payment_status, PaymentStatus::Paid | PaymentStatus::Refunded) => {
                return Err(OrderError::OrderClosed(order.id));
            }
            Some(inv) => Some(inv),
            None => None,
        };
        if order.status == OrderStatus::Served && pending_invoice.is_none() {
            return Err(OrderError::OrderClosed(order.id));
        }

        // 3. Validate items against the catalog
        let plan = ReservationPlan::build(ctx, &self.items)?;

        // 4. Build new items
        let origin = if pending_invoice.is_some() {
            ItemOrigin::AddedPostInvoice
        } else {
            ItemOrigin::AddedLater
        };
        let new_items = build_line_items(ctx, &plan, order.id, &self.items, origin)?;
        let total_added: Decimal = new_items.iter().map(LineItem::line_total).sum();
        let item_ids: Vec<i64> = new_items.iter().map(|i| i.id).collect();

        // 5. Reopen preparation
        let reopened = matches!(order.status, OrderStatus::Ready | OrderStatus::Served);
        if reopened {
            order.status = OrderStatus::InProgress;
            order.ready_at = None;
        }

        let now = ctx.now();
        order.items.extend(new_items.iter().cloned());
        order.recalculate_total();
        order.updated_at = now;

        // 6. Reserve stock, persist
        plan.commit(ctx)?;
        ctx.save_order(&order)?;
        ctx.emit(
            order.id,
            EventPayload::ItemsAdded {
                items: new_items,
                origin,
                reopened,
            },
        );

        // 7. Grow the pending invoice by the added amount
        let invoice_total = match pending_invoice {
            Some(mut inv) => {
                let subtotal = inv.subtotal + total_added;
                invoicing::apply_subtotal(&mut inv, subtotal, now);
                ctx.save_invoice(&inv)?;
                ctx.emit(
                    order.id,
                    EventPayload::InvoiceUpdated {
                        invoice_id: inv.id,
                        subtotal: inv.subtotal,
                        total: inv.total,
                    },
                );
                Some(inv.total)
            }
            None => None,
        };

        Ok(CommandOutcome::ItemsAdded(AmendmentResult {
            order_id: order.id,
            items_added: item_ids.len(),
            item_ids,
            total_added,
            origin,
            has_pending_invoice: invoice_total.is_some(),
            invoice_total,
            status: order.status,
        }))
    }
}
