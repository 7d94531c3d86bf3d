//! RemoveItem command handler
//!
//! Deletes a PENDING line item and returns its full remaining quantity to
//! stock. Removing the last item deletes the order and frees its table.

use crate::inventory;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{CommandOutcome, EventPayload, OrderStatus};

use super::sync_pending_invoice;

/// RemoveItem action
///
/// Restocks the item's full remaining quantity, not just one unit.
#[derive(Debug, Clone)]
pub struct RemoveItemAction {
    pub item_id: i64,
}

impl CommandHandler for RemoveItemAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        let mut order = ctx.load_order_for_item(self.item_id)?;

        let position = order
            .items
            .iter()
            .position(|i| i.id == self.item_id)
            .ok_or(OrderError::ItemNotFound(self.item_id))?;
        if !order.items[position].is_pending() {
            return Err(OrderError::ItemNotPending(self.item_id));
        }
        if !order.status.is_preparing() {
            return Err(OrderError::OrderNotActive {
                order_id: order.id,
                status: order.status,
            });
        }

        let item = order.items.remove(position);
        inventory::release_units(ctx, item.product_id, item.quantity)?;
        ctx.unindex_item(item.id)?;
        ctx.emit(
            order.id,
            EventPayload::ItemRemoved {
                item_id: item.id,
                product_id: item.product_id,
                quantity: item.quantity,
            },
        );

        // Empty order: delete it and free the table
        if order.items.is_empty() {
            ctx.delete_order(&order)?;
            let table_freed = ctx.release_table(&order)?;
            ctx.emit(order.id, EventPayload::OrderDeleted { table_freed });
            tracing::info!(order_id = order.id, table_freed, "Order deleted after last item removed");
            return Ok(CommandOutcome::ItemRemoved {
                order_id: order.id,
                item_id: item.id,
                restocked: item.quantity,
                order_deleted: true,
            });
        }

        let now = ctx.now();
        if order.status == OrderStatus::InProgress && order.pending_count() == 0 {
            order.status = OrderStatus::Ready;
            order.ready_at = Some(now);
            ctx.emit(
                order.id,
                EventPayload::OrderReady {
                    forced: false,
                    items_completed: 0,
                },
            );
        }
        order.recalculate_total();
        order.updated_at = now;
        ctx.save_order(&order)?;
        sync_pending_invoice(ctx, &order)?;

        Ok(CommandOutcome::ItemRemoved {
            order_id: order.id,
            item_id: item.id,
            restocked: item.quantity,
            order_deleted: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::MarkItemReadyAction;
    use super::*;
    use shared::models::TableStatus;
    use shared::order::OrderItemInput;

    #[test]
    fn test_remove_last_item_restores_stock_and_frees_table() {
        let storage = seeded_storage();
        let order = open_order(&storage, 3, vec![OrderItemInput::new(1, 3)]);
        assert_eq!(storage.get_product(1).unwrap().unwrap().stock, 7);

        let item_id = order.items[0].id;
        let outcome = run(&storage, &RemoveItemAction { item_id }).unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::ItemRemoved {
                order_id: order.id,
                item_id,
                restocked: 3,
                order_deleted: true
            }
        );

        assert_eq!(storage.get_product(1).unwrap().unwrap().stock, 10);
        assert!(storage.get_order(order.id).unwrap().is_none());
        assert_eq!(
            storage.get_table(3).unwrap().unwrap().status,
            TableStatus::Free
        );
    }

    #[test]
    fn test_removing_last_pending_item_readies_order() {
        let storage = seeded_storage();
        let order = open_order(
            &storage,
            3,
            vec![OrderItemInput::new(1, 1), OrderItemInput::new(2, 2)],
        );
        run(&storage, &MarkItemReadyAction { item_id: order.items[0].id }).unwrap();

        run(&storage, &RemoveItemAction { item_id: order.items[1].id }).unwrap();
        let stored = storage.get_order(order.id).unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Ready);
        assert_eq!(stored.items.len(), 1);
        assert_eq!(storage.get_product(2).unwrap().unwrap().stock, 3);
    }

    #[test]
    fn test_ready_item_cannot_be_removed() {
        let storage = seeded_storage();
        let order = open_order(
            &storage,
            3,
            vec![OrderItemInput::new(1, 1), OrderItemInput::new(2, 1)],
        );
        let item_id = order.items[0].id;
        run(&storage, &MarkItemReadyAction { item_id }).unwrap();

        let err = run(&storage, &RemoveItemAction { item_id }).unwrap_err();
        assert!(matches!(err, OrderError::ItemNotPending(_)));
    }
}
