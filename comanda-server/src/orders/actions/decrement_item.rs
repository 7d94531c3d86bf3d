//! DecrementItem command handler
//!
//! Reduces a PENDING line item by exactly one unit and returns that unit to
//! stock. Quantity 1 is a floor: the caller marks the item ready or removes
//! it instead.

use crate::inventory;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{CommandOutcome, EventPayload, ItemStatus};

use super::sync_pending_invoice;

/// DecrementItem action
#[derive(Debug, Clone)]
pub struct DecrementItemAction {
    pub item_id: i64,
}

impl CommandHandler for DecrementItemAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        let mut order = ctx.load_order_for_item(self.item_id)?;
        let status = order.status;
        let order_id = order.id;

        let item = order
            .item_mut(self.item_id)
            .ok_or(OrderError::ItemNotFound(self.item_id))?;
        if item.status == ItemStatus::Ready {
            return Err(OrderError::AlreadyReady(self.item_id));
        }
        if !status.is_preparing() {
            return Err(OrderError::OrderNotActive { order_id, status });
        }
        if item.quantity <= 1 {
            return Err(OrderError::AtMinimum(self.item_id));
        }

        item.quantity -= 1;
        let quantity = item.quantity;
        let product_id = item.product_id;

        inventory::release_units(ctx, product_id, 1)?;
        order.recalculate_total();
        order.updated_at = ctx.now();
        ctx.save_order(&order)?;
        ctx.emit(
            order_id,
            EventPayload::ItemDecremented {
                item_id: self.item_id,
                quantity,
            },
        );
        sync_pending_invoice(ctx, &order)?;

        Ok(CommandOutcome::ItemDecremented {
            order_id,
            item_id: self.item_id,
            quantity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::MarkItemReadyAction;
    use super::*;
    use rust_decimal::Decimal;
    use shared::order::OrderItemInput;

    #[test]
    fn test_decrement_returns_one_unit() {
        let storage = seeded_storage();
        let order = open_order(&storage, 3, vec![OrderItemInput::new(1, 3)]);
        let item_id = order.items[0].id;
        assert_eq!(storage.get_product(1).unwrap().unwrap().stock, 7);

        let outcome = run(&storage, &DecrementItemAction { item_id }).unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::ItemDecremented {
                order_id: order.id,
                item_id,
                quantity: 2
            }
        );
        let stored = storage.get_order(order.id).unwrap().unwrap();
        assert_eq!(stored.items[0].quantity, 2);
        assert_eq!(stored.total, Decimal::new(1000, 2));
        assert_eq!(storage.get_product(1).unwrap().unwrap().stock, 8);
    }

    #[test]
    fn test_at_minimum_is_rejected() {
        let storage = seeded_storage();
        let order = open_order(&storage, 3, vec![OrderItemInput::new(1, 1)]);
        let item_id = order.items[0].id;

        let err = run(&storage, &DecrementItemAction { item_id }).unwrap_err();
        assert!(matches!(err, OrderError::AtMinimum(_)));
        assert_eq!(
            storage.get_order(order.id).unwrap().unwrap().items[0].quantity,
            1
        );
        assert_eq!(storage.get_product(1).unwrap().unwrap().stock, 9);
    }

    #[test]
    fn test_ready_item_is_rejected() {
        let storage = seeded_storage();
        let order = open_order(
            &storage,
            3,
            vec![OrderItemInput::new(1, 3), OrderItemInput::new(2, 1)],
        );
        let item_id = order.items[0].id;
        run(&storage, &MarkItemReadyAction { item_id }).unwrap();

        let err = run(&storage, &DecrementItemAction { item_id }).unwrap_err();
        assert!(matches!(err, OrderError::AlreadyReady(_)));
    }
}
