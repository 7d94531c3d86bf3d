//! CreateOrder command handler
//!
//! Opens an order on a table with its first line items. The order goes
//! straight to the kitchen (IN_PROGRESS), stock is reserved and a physical
//! table becomes OCCUPIED, all in the command's transaction.

use crate::inventory::ReservationPlan;
use crate::orders::storage::IdKind;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use rust_decimal::Decimal;
use shared::order::{
    CommandOutcome, EventPayload, ItemOrigin, Order, OrderItemInput, OrderStatus,
};

use super::build_line_items;

/// CreateOrder action
#[derive(Debug, Clone)]
pub struct CreateOrderAction {
    pub table_id: i64,
    pub items: Vec<OrderItemInput>,
    pub note: Option<String>,
}

impl CommandHandler for CreateOrderAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        // 1. Validate table
        let mut table = ctx.load_table(self.table_id)?;
        if !table.is_active {
            return Err(OrderError::InvalidInput(format!(
                "table {} is not active",
                table.number
            )));
        }

        // 2. Validate items against the catalog (aggregated stock check)
        let plan = ReservationPlan::build(ctx, &self.items)?;

        // 3. Physical tables take one open order at a time
        if !table.is_virtual() && !table.is_free() {
            return Err(OrderError::TableUnavailable(table.number));
        }

        // 4. Build the aggregate
        let now = ctx.now();
        let order_id = ctx.next_id(IdKind::Order)?;
        let items = build_line_items(ctx, &plan, order_id, &self.items, ItemOrigin::Original)?;
        let mut order = Order {
            id: order_id,
            table_id: table.id,
            table_number: table.number,
            waiter_id: metadata.operator_id,
            waiter_name: metadata.operator_name.clone(),
            status: OrderStatus::InProgress,
            note: self.note.clone().filter(|n| !n.trim().is_empty()),
            items,
            total: Decimal::ZERO,
            created_at: now,
            confirmed_at: Some(now),
            sent_to_kitchen_at: Some(now),
            ready_at: None,
            served_at: None,
            updated_at: now,
        };
        order.recalculate_total();

        // 5. Reserve stock, occupy table, persist
        plan.commit(ctx)?;
        let table_occupied = ctx.occupy_table(&mut table)?;
        ctx.save_order(&order)?;

        let item_ids = order.items.iter().map(|i| i.id).collect();
        ctx.emit(
            order.id,
            EventPayload::OrderCreated {
                table_id: table.id,
                table_number: table.number,
                items: order.items.clone(),
                table_occupied,
            },
        );

        Ok(CommandOutcome::OrderCreated {
            order_id: order.id,
            table_number: table.number,
            item_ids,
            total: order.total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use shared::models::TableStatus;
    use shared::order::ItemStatus;

    #[test]
    fn test_create_order_reserves_and_occupies() {
        let storage = seeded_storage();
        let order = open_order(&storage, 3, vec![OrderItemInput::new(1, 2)]);

        assert_eq!(order.status, OrderStatus::InProgress);
        assert_eq!(order.total, Decimal::new(1000, 2));
        assert!(order.confirmed_at.is_some());
        assert!(order.sent_to_kitchen_at.is_some());
        assert_eq!(order.items[0].status, ItemStatus::Pending);
        assert_eq!(order.items[0].unit_price, Decimal::new(500, 2));
        assert_eq!(storage.get_product(1).unwrap().unwrap().stock, 8);
        assert_eq!(
            storage.get_table(3).unwrap().unwrap().status,
            TableStatus::Occupied
        );
    }

    #[test]
    fn test_virtual_table_is_never_occupied() {
        let storage = seeded_storage();
        open_order(&storage, 50, vec![OrderItemInput::new(1, 1)]);
        open_order(&storage, 50, vec![OrderItemInput::new(1, 1)]);
        assert_eq!(
            storage.get_table(50).unwrap().unwrap().status,
            TableStatus::Free
        );
    }

    #[test]
    fn test_occupied_table_rejected() {
        let storage = seeded_storage();
        open_order(&storage, 3, vec![OrderItemInput::new(1, 1)]);

        let action = CreateOrderAction {
            table_id: 3,
            items: vec![OrderItemInput::new(1, 1)],
            note: None,
        };
        let err = run(&storage, &action).unwrap_err();
        assert!(matches!(err, OrderError::TableUnavailable(3)));
        assert_eq!(storage.get_product(1).unwrap().unwrap().stock, 9);
    }

    #[test]
    fn test_insufficient_stock_leaves_nothing_behind() {
        let storage = seeded_storage();
        let action = CreateOrderAction {
            table_id: 3,
            items: vec![OrderItemInput::new(1, 2), OrderItemInput::new(2, 4)],
            note: None,
        };
        let err = run(&storage, &action).unwrap_err();
        assert!(matches!(err, OrderError::InsufficientStock { available: 3, .. }));

        assert_eq!(storage.get_product(1).unwrap().unwrap().stock, 10);
        assert_eq!(storage.get_product(2).unwrap().unwrap().stock, 3);
        assert!(storage.list_orders().unwrap().is_empty());
        assert!(storage.get_table(3).unwrap().unwrap().is_free());
    }

    #[test]
    fn test_invalid_input() {
        let storage = seeded_storage();
        let empty = CreateOrderAction {
            table_id: 3,
            items: vec![],
            note: None,
        };
        assert!(matches!(
            run(&storage, &empty).unwrap_err(),
            OrderError::InvalidInput(_)
        ));

        let unknown_table = CreateOrderAction {
            table_id: 99,
            items: vec![OrderItemInput::new(1, 1)],
            note: None,
        };
        assert!(matches!(
            run(&storage, &unknown_table).unwrap_err(),
            OrderError::TableNotFound(99)
        ));
    }
}
