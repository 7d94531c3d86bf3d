//! ServeOrder command handler
//!
//! READY → SERVED. Frees a physical table and gets-or-creates the order's
//! invoice: an existing pending invoice is re-derived in place, so an order
//! never holds more than one invoice.

use crate::invoicing;
use crate::orders::storage::IdKind;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use rust_decimal::Decimal;
use shared::models::CustomerInfo;
use shared::order::{CommandOutcome, EventPayload, OrderStatus, ServeResult};

/// ServeOrder action
#[derive(Debug, Clone)]
pub struct ServeOrderAction {
    pub order_id: i64,
}

impl CommandHandler for ServeOrderAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        let mut order = ctx.load_order(self.order_id)?;

        let pending = order.pending_count();
        if pending > 0 {
            return Err(OrderError::ItemsPending {
                order_id: order.id,
                pending,
            });
        }
        if order.status != OrderStatus::Ready {
            return Err(OrderError::NotReady {
                order_id: order.id,
                status: order.status,
            });
        }

        let now = ctx.now();
        order.status = OrderStatus::Served;
        order.served_at = Some(now);
        order.recalculate_total();
        order.updated_at = now;
        ctx.save_order(&order)?;
        let table_freed = ctx.release_table(&order)?;

        // Get-or-create the invoice
        let (invoice, invoice_created) = match ctx.invoice_for_order(order.id)? {
            Some(mut invoice) => {
                if invoice.payment_status.is_pending() {
                    invoicing::apply_subtotal(&mut invoice, order.total, now);
                    ctx.save_invoice(&invoice)?;
                    ctx.emit(
                        order.id,
                        EventPayload::InvoiceUpdated {
                            invoice_id: invoice.id,
                            subtotal: invoice.subtotal,
                            total: invoice.total,
                        },
                    );
                }
                (invoice, false)
            }
            None => {
                let invoice_id = ctx.next_id(IdKind::Invoice)?;
                let invoice = invoicing::new_invoice(
                    invoice_id,
                    &order,
                    Decimal::ZERO,
                    Decimal::ZERO,
                    CustomerInfo::default(),
                    now,
                );
                ctx.save_invoice(&invoice)?;
                ctx.emit(
                    order.id,
                    EventPayload::InvoiceCreated {
                        invoice_id: invoice.id,
                        invoice_number: invoice.number.clone(),
                        total: invoice.total,
                    },
                );
                (invoice, true)
            }
        };

        ctx.emit(
            order.id,
            EventPayload::OrderServed {
                total: order.total,
                table_freed,
            },
        );

        Ok(CommandOutcome::OrderServed(ServeResult {
            order_id: order.id,
            invoice_id: invoice.id,
            invoice_number: invoice.number,
            invoice_created,
            table_freed,
            total: invoice.total,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{AddItemsAction, CompleteOrderAction};
    use super::*;
    use shared::models::{PaymentStatus, TableStatus};
    use shared::order::OrderItemInput;

    #[test]
    fn test_serve_creates_invoice_and_frees_table() {
        let storage = seeded_storage();
        let order = open_order(&storage, 3, vec![OrderItemInput::new(1, 2)]);
        run(&storage, &CompleteOrderAction { order_id: order.id }).unwrap();

        let outcome = run(&storage, &ServeOrderAction { order_id: order.id }).unwrap();
        let CommandOutcome::OrderServed(result) = outcome else {
            panic!("expected OrderServed");
        };
        assert!(result.invoice_created);
        assert!(result.table_freed);
        assert_eq!(result.total, Decimal::new(1000, 2));
        assert_eq!(result.invoice_number, "FAC-000001");

        let stored = storage.get_order(order.id).unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Served);
        assert!(stored.served_at.is_some());
        assert_eq!(
            storage.get_table(3).unwrap().unwrap().status,
            TableStatus::Free
        );
        let invoice = storage.invoice_for_order(order.id).unwrap().unwrap();
        assert_eq!(invoice.payment_status, PaymentStatus::Unpaid);
    }

    #[test]
    fn test_serve_with_pending_items_rejected() {
        let storage = seeded_storage();
        let order = open_order(&storage, 3, vec![OrderItemInput::new(1, 2)]);
        let err = run(&storage, &ServeOrderAction { order_id: order.id }).unwrap_err();
        assert!(matches!(err, OrderError::ItemsPending { pending: 1, .. }));
        assert!(storage.invoice_for_order(order.id).unwrap().is_none());
    }

    #[test]
    fn test_reserve_updates_existing_invoice() {
        let storage = seeded_storage();
        let order = open_order(&storage, 3, vec![OrderItemInput::new(1, 2)]);
        run(&storage, &CompleteOrderAction { order_id: order.id }).unwrap();
        run(&storage, &ServeOrderAction { order_id: order.id }).unwrap();

        run(
            &storage,
            &AddItemsAction {
                order_id: order.id,
                items: vec![OrderItemInput::new(1, 1)],
            },
        )
        .unwrap();
        run(&storage, &CompleteOrderAction { order_id: order.id }).unwrap();
        let outcome = run(&storage, &ServeOrderAction { order_id: order.id }).unwrap();
        let CommandOutcome::OrderServed(result) = outcome else {
            panic!("expected OrderServed");
        };
        assert!(!result.invoice_created);
        assert_eq!(result.total, Decimal::new(1500, 2));
        assert_eq!(storage.list_invoices().unwrap().len(), 1);
    }

    #[test]
    fn test_serve_twice_is_rejected() {
        let storage = seeded_storage();
        let order = open_order(&storage, 3, vec![OrderItemInput::new(1, 1)]);
        run(&storage, &CompleteOrderAction { order_id: order.id }).unwrap();
        run(&storage, &ServeOrderAction { order_id: order.id }).unwrap();

        let err = run(&storage, &ServeOrderAction { order_id: order.id }).unwrap_err();
        assert!(matches!(
            err,
            OrderError::NotReady {
                status: OrderStatus::Served,
                ..
            }
        ));
        assert_eq!(storage.list_invoices().unwrap().len(), 1);
    }
}
