use super::*;
use rust_decimal::Decimal;
use shared::models::{PaymentMethod, PaymentStatus, TableStatus};
use shared::order::{
    CommandErrorCode, CommandOutcome, FailureKind, OrderCommandPayload, OrderEventType,
    OrderItemInput,
};

mod test_core;
mod test_flows;

fn product(id: i64, name: &str, cents: i64, stock: u32) -> Product {
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

fn table(id: i64, number: u32) -> DiningTable {
    DiningTable {
        id,
        number,
        capacity: 4,
        status: TableStatus::Free,
        is_active: true,
    }
}

/// Manager over an in-memory database with
/// Soup (id 1, 5.00, stock 10), Bread (id 2, 1.50, stock 3),
/// table 3, the delivery slot (0) and the to-go slot (50)
fn create_test_manager() -> OrdersManager {
    let storage = OrderStorage::open_in_memory().unwrap();
    let txn = storage.begin_write().unwrap();
    storage.put_product(&txn, &product(1, "Soup", 500, 10)).unwrap();
    storage.put_product(&txn, &product(2, "Bread", 150, 3)).unwrap();
    storage.put_table(&txn, &table(3, 3)).unwrap();
    storage.put_table(&txn, &table(100, 0)).unwrap();
    storage.put_table(&txn, &table(150, 50)).unwrap();
    txn.commit().unwrap();
    OrdersManager::with_storage(storage).unwrap()
}

fn cmd(payload: OrderCommandPayload) -> OrderCommand {
    OrderCommand::new(1, "Test Operator", payload)
}

fn execute_ok(manager: &OrdersManager, payload: OrderCommandPayload) -> CommandOutcome {
    let resp = manager.execute_command(cmd(payload));
    assert!(resp.success, "command failed: {:?}", resp.error);
    resp.outcome.unwrap()
}

fn execute_err(manager: &OrdersManager, payload: OrderCommandPayload) -> CommandErrorCode {
    let resp = manager.execute_command(cmd(payload));
    assert!(!resp.success, "command unexpectedly succeeded: {:?}", resp.outcome);
    resp.error.unwrap().code
}

fn create_order(manager: &OrdersManager, table_id: i64, items: Vec<OrderItemInput>) -> i64 {
    match execute_ok(
        manager,
        OrderCommandPayload::CreateOrder {
            table_id,
            items,
            note: None,
        },
    ) {
        CommandOutcome::OrderCreated { order_id, .. } => order_id,
        other => panic!("unexpected outcome: {:?}", other),
    }
}

fn item_ids(manager: &OrdersManager, order_id: i64) -> Vec<i64> {
    manager
        .get_order(order_id)
        .unwrap()
        .unwrap()
        .items
        .iter()
        .map(|i| i.id)
        .collect()
}

fn stock_of(manager: &OrdersManager, product_id: i64) -> u32 {
    manager
        .storage()
        .get_product(product_id)
        .unwrap()
        .unwrap()
        .stock
}

fn table_status(manager: &OrdersManager, table_id: i64) -> TableStatus {
    manager
        .storage()
        .get_table(table_id)
        .unwrap()
        .unwrap()
        .status
}

/// Create, complete and serve an order; returns (order_id, invoice_id)
fn served_order(manager: &OrdersManager, table_id: i64, items: Vec<OrderItemInput>) -> (i64, i64) {
    let order_id = create_order(manager, table_id, items);
    execute_ok(manager, OrderCommandPayload::CompleteOrder { order_id });
    match execute_ok(manager, OrderCommandPayload::ServeOrder { order_id }) {
        CommandOutcome::OrderServed(result) => (order_id, result.invoice_id),
        other => panic!("unexpected outcome: {:?}", other),
    }
}
