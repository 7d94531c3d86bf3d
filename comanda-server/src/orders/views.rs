//! Read models built from stored orders
//!
//! Pure functions: callers load orders (already ordered by id, which is
//! creation order) and pass the current time.

use shared::models::{DiningTable, Invoice, Product, StockLevel};
use shared::order::{
    ItemOrigin, KitchenBoard, KitchenOrderView, LineItem, Order, OrderDetail, OrderSummary,
    PendingItemView, Priority, PriorityBuckets, StockBoard,
};
use shared::util::elapsed_minutes;

/// Orders older than this are urgent
pub const URGENT_AFTER_MINUTES: i64 = 30;
/// Orders younger than this are fresh
pub const FRESH_BEFORE_MINUTES: i64 = 10;
/// Window for "recent orders" on the stock board
pub const RECENT_WINDOW_MS: i64 = 5 * 60_000;
pub const RECENT_LIMIT: usize = 5;

pub fn priority_for(age_minutes: i64) -> Priority {
    if age_minutes > URGENT_AFTER_MINUTES {
        Priority::Urgent
    } else if age_minutes < FRESH_BEFORE_MINUTES {
        Priority::Fresh
    } else {
        Priority::Normal
    }
}

/// Kitchen board over active orders, oldest first
pub fn kitchen_board(orders: &[Order], now: i64) -> KitchenBoard {
    let mut board = KitchenBoard::default();
    for order in orders.iter().filter(|o| o.status.is_active()) {
        let age_minutes = elapsed_minutes(order.created_at, now);
        let priority = priority_for(age_minutes);
        let pending_count = order.pending_count();
        board.pending_items += pending_count;
        if priority == Priority::Urgent {
            board.urgent_orders += 1;
        }
        board.orders.push(KitchenOrderView {
            order_id: order.id,
            table_number: order.table_number,
            table_label: DiningTable::label_for(order.table_number),
            waiter_name: order.waiter_name.clone(),
            status: order.status,
            note: order.note.clone(),
            created_at: order.created_at,
            age_minutes,
            priority,
            pending_count,
            items: order.items.clone(),
        });
    }
    board
}

/// Pending items bucketed by age, oldest first in each bucket
pub fn pending_by_priority(orders: &[Order], now: i64) -> PriorityBuckets {
    let mut pending: Vec<PendingItemView> = orders
        .iter()
        .filter(|o| o.status.is_active())
        .flat_map(|order| {
            order
                .items
                .iter()
                .filter(|i| i.is_pending())
                .map(move |item| PendingItemView {
                    order_id: order.id,
                    table_number: order.table_number,
                    item: item.clone(),
                    age_minutes: elapsed_minutes(item.created_at, now),
                })
        })
        .collect();
    pending.sort_by_key(|p| (p.item.created_at, p.item.id));

    let mut buckets = PriorityBuckets::default();
    for view in pending {
        match priority_for(view.age_minutes) {
            Priority::Urgent => buckets.urgent.push(view),
            Priority::Normal => buckets.normal.push(view),
            Priority::Fresh => buckets.fresh.push(view),
        }
    }
    buckets
}

pub fn order_summary(order: &Order, has_pending_invoice: bool) -> OrderSummary {
    OrderSummary {
        order_id: order.id,
        table_number: order.table_number,
        waiter_id: order.waiter_id,
        waiter_name: order.waiter_name.clone(),
        status: order.status,
        total: order.total,
        item_count: order.items.len(),
        pending_count: order.pending_count(),
        has_pending_invoice,
        created_at: order.created_at,
    }
}

/// Orderable products plus the most recent orders
pub fn stock_board(products: &[Product], orders: &[Order], now: i64) -> StockBoard {
    let mut recent: Vec<&Order> = orders
        .iter()
        .filter(|o| now - o.created_at <= RECENT_WINDOW_MS)
        .collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    StockBoard {
        products: products
            .iter()
            .filter(|p| p.is_orderable())
            .map(StockLevel::from)
            .collect(),
        recent_orders: recent
            .into_iter()
            .take(RECENT_LIMIT)
            .map(|o| order_summary(o, false))
            .collect(),
    }
}

pub fn order_detail(order: Order, invoice: Option<Invoice>) -> OrderDetail {
    let (original_items, added_items): (Vec<LineItem>, Vec<LineItem>) = order
        .items
        .iter()
        .cloned()
        .partition(|i| i.origin == ItemOrigin::Original);
    let pending_count = order.pending_count();
    OrderDetail {
        completed: pending_count == 0,
        pending_count,
        original_items,
        added_items,
        invoice,
        order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::order::{ItemStatus, OrderStatus};

    const MINUTE: i64 = 60_000;

    fn order(id: i64, created_at: i64, status: OrderStatus, items: Vec<(ItemStatus, ItemOrigin)>) -> Order {
        Order {
            id,
            table_id: id,
            table_number: id as u32,
            waiter_id: 1,
            waiter_name: "Ana".to_string(),
            status,
            note: None,
            items: items
                .into_iter()
                .enumerate()
                .map(|(n, (status, origin))| LineItem {
                    id: id * 10 + n as i64,
                    order_id: id,
                    product_id: 1,
                    product_name: "Soup".to_string(),
                    quantity: 1,
                    unit_price: Decimal::new(500, 2),
                    status,
                    origin,
                    note: None,
                    created_at,
                    ready_at: None,
                })
                .collect(),
            total: Decimal::ZERO,
            created_at,
            confirmed_at: None,
            sent_to_kitchen_at: None,
            ready_at: None,
            served_at: None,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_priority_thresholds() {
        assert_eq!(priority_for(0), Priority::Fresh);
        assert_eq!(priority_for(9), Priority::Fresh);
        assert_eq!(priority_for(10), Priority::Normal);
        assert_eq!(priority_for(30), Priority::Normal);
        assert_eq!(priority_for(31), Priority::Urgent);
    }

    #[test]
    fn test_kitchen_board_skips_served() {
        let now = 100 * MINUTE;
        let orders = vec![
            order(1, 0, OrderStatus::InProgress, vec![(ItemStatus::Pending, ItemOrigin::Original)]),
            order(2, 95 * MINUTE, OrderStatus::Served, vec![(ItemStatus::Ready, ItemOrigin::Original)]),
            order(3, 95 * MINUTE, OrderStatus::Ready, vec![(ItemStatus::Ready, ItemOrigin::Original)]),
        ];
        let board = kitchen_board(&orders, now);
        assert_eq!(board.orders.len(), 2);
        assert_eq!(board.orders[0].order_id, 1);
        assert_eq!(board.orders[0].priority, Priority::Urgent);
        assert_eq!(board.orders[1].priority, Priority::Fresh);
        assert_eq!(board.pending_items, 1);
        assert_eq!(board.urgent_orders, 1);
    }

    #[test]
    fn test_pending_buckets() {
        let now = 60 * MINUTE;
        let orders = vec![
            order(1, 0, OrderStatus::InProgress, vec![(ItemStatus::Pending, ItemOrigin::Original)]),
            order(2, 40 * MINUTE, OrderStatus::InProgress, vec![
                (ItemStatus::Pending, ItemOrigin::Original),
                (ItemStatus::Ready, ItemOrigin::Original),
            ]),
            order(3, 55 * MINUTE, OrderStatus::InProgress, vec![(ItemStatus::Pending, ItemOrigin::Original)]),
        ];
        let buckets = pending_by_priority(&orders, now);
        assert_eq!(buckets.urgent.len(), 1);
        assert_eq!(buckets.normal.len(), 1);
        assert_eq!(buckets.fresh.len(), 1);
        assert_eq!(buckets.urgent[0].order_id, 1);
    }

    #[test]
    fn test_order_detail_splits_items() {
        let o = order(1, 0, OrderStatus::InProgress, vec![
            (ItemStatus::Ready, ItemOrigin::Original),
            (ItemStatus::Pending, ItemOrigin::AddedPostInvoice),
        ]);
        let detail = order_detail(o, None);
        assert_eq!(detail.original_items.len(), 1);
        assert_eq!(detail.added_items.len(), 1);
        assert_eq!(detail.pending_count, 1);
        assert!(!detail.completed);
    }

    #[test]
    fn test_stock_board_recent_orders() {
        let now = 10 * MINUTE;
        let orders: Vec<Order> = (1..=7)
            .map(|id| order(id, now - (7 - id) * 30_000, OrderStatus::InProgress, vec![]))
            .chain(std::iter::once(order(8, 0, OrderStatus::InProgress, vec![])))
            .collect();
        let board = stock_board(&[], &orders, now);
        assert_eq!(board.recent_orders.len(), RECENT_LIMIT);
        assert_eq!(board.recent_orders[0].order_id, 7);
        assert!(board.recent_orders.iter().all(|o| o.order_id != 8));
    }
}
