//! CompleteOrder command handler (force-complete)
//!
//! Marks every PENDING item READY and moves the order to READY.

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{CommandOutcome, EventPayload, ItemStatus, OrderStatus};

/// CompleteOrder action
#[derive(Debug, Clone)]
pub struct CompleteOrderAction {
    pub order_id: i64,
}

impl CommandHandler for CompleteOrderAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        let mut order = ctx.load_order(self.order_id)?;
        match order.status {
            OrderStatus::New | OrderStatus::InProgress => {}
            OrderStatus::Ready => return Err(OrderError::OrderAlreadyReady(order.id)),
            OrderStatus::Served => {
                return Err(OrderError::OrderNotActive {
                    order_id: order.id,
                    status: order.status,
                });
            }
        }

        let now = ctx.now();
        let mut items_completed = 0;
        for item in order.items.iter_mut().filter(|i| i.is_pending()) {
            item.status = ItemStatus::Ready;
            item.ready_at = Some(now);
            items_completed += 1;
        }
        order.status = OrderStatus::Ready;
        order.ready_at = Some(now);
        order.updated_at = now;
        ctx.save_order(&order)?;

        ctx.emit(
            order.id,
            EventPayload::OrderReady {
                forced: true,
                items_completed,
            },
        );

        Ok(CommandOutcome::OrderCompleted {
            order_id: order.id,
            items_completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use shared::order::OrderItemInput;

    #[test]
    fn test_force_complete() {
        let storage = seeded_storage();
        let order = open_order(
            &storage,
            3,
            vec![OrderItemInput::new(1, 1), OrderItemInput::new(2, 1)],
        );

        let outcome = run(&storage, &CompleteOrderAction { order_id: order.id }).unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::OrderCompleted {
                order_id: order.id,
                items_completed: 2
            }
        );
        let stored = storage.get_order(order.id).unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Ready);
        assert_eq!(stored.pending_count(), 0);

        let err = run(&storage, &CompleteOrderAction { order_id: order.id }).unwrap_err();
        assert!(matches!(err, OrderError::OrderAlreadyReady(_)));
    }
}
