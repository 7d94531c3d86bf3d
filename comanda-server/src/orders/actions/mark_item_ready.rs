//! MarkItemReady command handler
//!
//! Kitchen marks one line item READY. When the last pending item of an
//! order becomes ready, the order itself becomes READY.

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{CommandOutcome, CompletionStatus, EventPayload, ItemStatus, OrderStatus};

/// MarkItemReady action
#[derive(Debug, Clone)]
pub struct MarkItemReadyAction {
    pub item_id: i64,
}

impl CommandHandler for MarkItemReadyAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        let mut order = ctx.load_order_for_item(self.item_id)?;
        let now = ctx.now();

        let item = order
            .item_mut(self.item_id)
            .ok_or(OrderError::ItemNotFound(self.item_id))?;
        if item.status == ItemStatus::Ready {
            return Err(OrderError::AlreadyReady(self.item_id));
        }
        let product_name = item.product_name.clone();
        item.status = ItemStatus::Ready;
        item.ready_at = Some(now);

        if !order.status.is_active() {
            return Err(OrderError::OrderNotActive {
                order_id: order.id,
                status: order.status,
            });
        }

        let pending_remaining = order.pending_count();
        let order_completed = pending_remaining == 0;
        if order_completed {
            order.status = OrderStatus::Ready;
            order.ready_at = Some(now);
        }
        order.updated_at = now;
        ctx.save_order(&order)?;

        ctx.emit(
            order.id,
            EventPayload::ItemReady {
                item_id: self.item_id,
                product_name,
            },
        );
        if order_completed {
            ctx.emit(
                order.id,
                EventPayload::OrderReady {
                    forced: false,
                    items_completed: 1,
                },
            );
        }

        Ok(CommandOutcome::ItemReady(CompletionStatus {
            order_id: order.id,
            item_id: self.item_id,
            order_completed,
            pending_remaining,
            status: order.status,
        }))
    }
}
