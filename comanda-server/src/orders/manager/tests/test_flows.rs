use super::*;

// ========================================================================
// Full lifecycle
// ========================================================================

#[test]
fn test_soup_order_full_lifecycle() {
    let manager = create_test_manager();

    let order_id = create_order(&manager, 3, vec![OrderItemInput::new(1, 2)]);
    assert_eq!(stock_of(&manager, 1), 8);
    assert_eq!(table_status(&manager, 3), TableStatus::Occupied);
    let order = manager.get_order(order_id).unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::InProgress);
    assert_eq!(order.total, Decimal::new(1000, 2));

    let item_id = item_ids(&manager, order_id)[0];
    match execute_ok(&manager, OrderCommandPayload::MarkItemReady { item_id }) {
        CommandOutcome::ItemReady(status) => {
            assert!(status.order_completed);
            assert_eq!(status.status, OrderStatus::Ready);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let result = match execute_ok(&manager, OrderCommandPayload::ServeOrder { order_id }) {
        CommandOutcome::OrderServed(result) => result,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert!(result.invoice_created);
    assert!(result.table_freed);
    assert_eq!(result.total, Decimal::new(1000, 2));
    assert_eq!(table_status(&manager, 3), TableStatus::Free);

    let invoice = manager.invoice_for_order(order_id).unwrap().unwrap();
    assert_eq!(invoice.payment_status, PaymentStatus::Unpaid);
    assert_eq!(manager.pending_invoices().unwrap().len(), 1);

    let paid = match execute_ok(
        &manager,
        OrderCommandPayload::PayInvoice {
            invoice_id: invoice.id,
            method: PaymentMethod::Cash,
            amount: Decimal::new(1000, 2),
            note: None,
        },
    ) {
        CommandOutcome::InvoicePaid(result) => result,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    assert_eq!(paid.change, Decimal::ZERO);
    assert!(manager.pending_invoices().unwrap().is_empty());

    let events = manager.get_events_for_order(order_id).unwrap();
    let types: Vec<OrderEventType> = events.iter().map(|e| e.event_type).collect();
    assert_eq!(
        types,
        vec![
            OrderEventType::OrderCreated,
            OrderEventType::ItemReady,
            OrderEventType::OrderReady,
            OrderEventType::InvoiceCreated,
            OrderEventType::OrderServed,
            OrderEventType::InvoicePaid,
        ]
    );
    assert!(events.windows(2).all(|w| w[0].sequence < w[1].sequence));
}

#[test]
fn test_overpayment_returns_change() {
    let manager = create_test_manager();
    let (_, invoice_id) = served_order(&manager, 3, vec![OrderItemInput::new(1, 2)]);

    match execute_ok(
        &manager,
        OrderCommandPayload::PayInvoice {
            invoice_id,
            method: PaymentMethod::Cash,
            amount: Decimal::new(1500, 2),
            note: None,
        },
    ) {
        CommandOutcome::InvoicePaid(result) => {
            assert_eq!(result.change, Decimal::new(500, 2));
            assert_eq!(result.payment_status, PaymentStatus::Paid);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let code = execute_err(
        &manager,
        OrderCommandPayload::PayInvoice {
            invoice_id,
            method: PaymentMethod::Cash,
            amount: Decimal::new(1000, 2),
            note: None,
        },
    );
    assert_eq!(code, CommandErrorCode::AlreadyPaid);
}

#[test]
fn test_reserve_keeps_single_invoice() {
    let manager = create_test_manager();
    let (order_id, invoice_id) = served_order(&manager, 3, vec![OrderItemInput::new(1, 2)]);

    // Extra round after the invoice: the order goes back to the kitchen
    execute_ok(
        &manager,
        OrderCommandPayload::AddItems {
            order_id,
            items: vec![OrderItemInput::new(2, 1)],
        },
    );
    assert_eq!(
        manager.get_order(order_id).unwrap().unwrap().status,
        OrderStatus::InProgress
    );
    let detail = manager.order_detail(order_id).unwrap().unwrap();
    assert_eq!(detail.added_items.len(), 1);
    assert_eq!(detail.invoice.unwrap().total, Decimal::new(1150, 2));

    execute_ok(&manager, OrderCommandPayload::CompleteOrder { order_id });
    match execute_ok(&manager, OrderCommandPayload::ServeOrder { order_id }) {
        CommandOutcome::OrderServed(result) => {
            assert!(!result.invoice_created);
            assert_eq!(result.invoice_id, invoice_id);
            assert_eq!(result.total, Decimal::new(1150, 2));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let invoices: Vec<_> = manager
        .storage()
        .list_invoices()
        .unwrap()
        .into_iter()
        .filter(|inv| inv.order_id == order_id)
        .collect();
    assert_eq!(invoices.len(), 1);

    let code = execute_err(
        &manager,
        OrderCommandPayload::CreateInvoice {
            order_id,
            discount_percent: Decimal::ZERO,
            apply_tax: false,
            customer: Default::default(),
        },
    );
    assert_eq!(code, CommandErrorCode::InvoiceExists);
}

#[test]
fn test_refund_restocks_and_closes_order() {
    let manager = create_test_manager();
    let (order_id, invoice_id) = served_order(&manager, 3, vec![OrderItemInput::new(1, 2)]);
    execute_ok(
        &manager,
        OrderCommandPayload::PayInvoice {
            invoice_id,
            method: PaymentMethod::CreditCard,
            amount: Decimal::new(1000, 2),
            note: None,
        },
    );
    assert_eq!(stock_of(&manager, 1), 8);

    execute_ok(
        &manager,
        OrderCommandPayload::RefundInvoice {
            invoice_id,
            reason: "cold soup".to_string(),
            amount: None,
        },
    );
    assert_eq!(stock_of(&manager, 1), 10);

    let code = execute_err(
        &manager,
        OrderCommandPayload::AddItems {
            order_id,
            items: vec![OrderItemInput::new(1, 1)],
        },
    );
    assert_eq!(code, CommandErrorCode::OrderClosed);
}

// ========================================================================
// Item adjustments
// ========================================================================

#[test]
fn test_decrement_to_minimum() {
    let manager = create_test_manager();
    let order_id = create_order(&manager, 3, vec![OrderItemInput::new(1, 2)]);
    let item_id = item_ids(&manager, order_id)[0];

    execute_ok(&manager, OrderCommandPayload::DecrementItem { item_id });
    assert_eq!(stock_of(&manager, 1), 9);
    assert_eq!(
        manager.get_order(order_id).unwrap().unwrap().total,
        Decimal::new(500, 2)
    );

    let code = execute_err(&manager, OrderCommandPayload::DecrementItem { item_id });
    assert_eq!(code, CommandErrorCode::AtMinimum);
    assert_eq!(stock_of(&manager, 1), 9);
}

#[test]
fn test_mark_ready_twice_is_rejected_without_side_effects() {
    let manager = create_test_manager();
    let order_id = create_order(
        &manager,
        3,
        vec![OrderItemInput::new(1, 1), OrderItemInput::new(2, 1)],
    );
    let item_id = item_ids(&manager, order_id)[0];

    execute_ok(&manager, OrderCommandPayload::MarkItemReady { item_id });
    let version = manager.channel_version(SyncChannel::Kitchen);
    let code = execute_err(&manager, OrderCommandPayload::MarkItemReady { item_id });
    assert_eq!(code, CommandErrorCode::AlreadyReady);
    assert_eq!(code.kind(), FailureKind::StateConflict);
    assert_eq!(manager.channel_version(SyncChannel::Kitchen), version);
    assert_eq!(
        manager.get_order(order_id).unwrap().unwrap().status,
        OrderStatus::InProgress
    );
}

#[test]
fn test_remove_last_item_deletes_order() {
    let manager = create_test_manager();
    let order_id = create_order(&manager, 3, vec![OrderItemInput::new(2, 3)]);
    assert_eq!(stock_of(&manager, 2), 0);
    let item_id = item_ids(&manager, order_id)[0];

    match execute_ok(&manager, OrderCommandPayload::RemoveItem { item_id }) {
        CommandOutcome::ItemRemoved {
            restocked,
            order_deleted,
            ..
        } => {
            assert_eq!(restocked, 3);
            assert!(order_deleted);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(stock_of(&manager, 2), 3);
    assert!(manager.get_order(order_id).unwrap().is_none());
    assert_eq!(table_status(&manager, 3), TableStatus::Free);
}

// ========================================================================
// Tables and stock
// ========================================================================

#[test]
fn test_insufficient_stock_changes_nothing() {
    let manager = create_test_manager();
    let code = execute_err(
        &manager,
        OrderCommandPayload::CreateOrder {
            table_id: 3,
            items: vec![OrderItemInput::new(1, 2), OrderItemInput::new(2, 4)],
            note: None,
        },
    );
    assert_eq!(code, CommandErrorCode::InsufficientStock);
    assert_eq!(code.kind(), FailureKind::Resource);
    assert_eq!(stock_of(&manager, 1), 10);
    assert_eq!(stock_of(&manager, 2), 3);
    assert_eq!(table_status(&manager, 3), TableStatus::Free);
    assert!(manager.get_active_orders().unwrap().is_empty());
}

#[test]
fn test_occupied_table_rejects_second_order() {
    let manager = create_test_manager();
    create_order(&manager, 3, vec![OrderItemInput::new(1, 1)]);
    let code = execute_err(
        &manager,
        OrderCommandPayload::CreateOrder {
            table_id: 3,
            items: vec![OrderItemInput::new(1, 1)],
            note: None,
        },
    );
    assert_eq!(code, CommandErrorCode::TableUnavailable);
    assert_eq!(stock_of(&manager, 1), 9);
}

#[test]
fn test_virtual_tables_take_many_orders() {
    let manager = create_test_manager();
    create_order(&manager, 150, vec![OrderItemInput::new(1, 1)]);
    create_order(&manager, 150, vec![OrderItemInput::new(1, 1)]);
    create_order(&manager, 100, vec![OrderItemInput::new(1, 1)]);
    assert_eq!(table_status(&manager, 150), TableStatus::Free);
    assert_eq!(table_status(&manager, 100), TableStatus::Free);
    assert_eq!(manager.get_active_orders().unwrap().len(), 3);

    let board = manager.kitchen_board().unwrap();
    assert_eq!(board.orders.len(), 3);
    assert_eq!(board.orders[0].table_label, "To-go");
    assert_eq!(board.orders[2].table_label, "Delivery");
}

#[test]
fn test_open_orders_include_unpaid_served() {
    let manager = create_test_manager();
    let (served_id, _) = served_order(&manager, 3, vec![OrderItemInput::new(1, 1)]);
    let active_id = create_order(&manager, 150, vec![OrderItemInput::new(2, 1)]);

    let open = manager.open_orders(None).unwrap();
    let ids: Vec<i64> = open.iter().map(|o| o.order_id).collect();
    assert!(ids.contains(&served_id));
    assert!(ids.contains(&active_id));
    assert!(open.iter().any(|o| o.order_id == served_id && o.has_pending_invoice));

    assert!(manager.open_orders(Some(99)).unwrap().is_empty());

    let on_table = manager.order_for_table(3).unwrap().unwrap();
    assert_eq!(on_table.order.id, served_id);
    assert!(on_table.invoice.is_some());
}

#[test]
fn test_invoice_detail_by_id() {
    let manager = create_test_manager();
    let (order_id, invoice_id) = served_order(
        &manager,
        3,
        vec![OrderItemInput::new(1, 2), OrderItemInput::new(2, 1)],
    );

    let detail = manager.invoice_detail(invoice_id).unwrap().unwrap();
    assert_eq!(detail.invoice.id, invoice_id);
    assert_eq!(detail.invoice.total, Decimal::new(1150, 2));
    assert_eq!(detail.order.order.id, order_id);
    assert_eq!(detail.order.order.table_number, 3);
    assert_eq!(detail.order.order.waiter_name, "Test Operator");
    assert_eq!(detail.order.original_items.len(), 2);

    assert!(manager.invoice_detail(999).unwrap().is_none());
}
