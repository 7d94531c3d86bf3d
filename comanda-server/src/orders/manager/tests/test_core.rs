use super::*;

#[test]
fn test_duplicate_command_id() {
    let manager = create_test_manager();
    let command = cmd(OrderCommandPayload::CreateOrder {
        table_id: 150,
        items: vec![OrderItemInput::new(1, 1)],
        note: None,
    })
    .with_command_id("retry-1");

    let first = manager.execute_command(command.clone());
    assert!(first.success);
    assert_ne!(first.outcome, Some(CommandOutcome::Duplicate));

    let second = manager.execute_command(command);
    assert!(second.success);
    assert_eq!(second.outcome, Some(CommandOutcome::Duplicate));

    assert_eq!(stock_of(&manager, 1), 9);
    assert_eq!(manager.get_active_orders().unwrap().len(), 1);
}

#[test]
fn test_pruning_keeps_recent_command_ids() {
    let manager = create_test_manager();
    let command = cmd(OrderCommandPayload::CreateOrder {
        table_id: 150,
        items: vec![OrderItemInput::new(1, 1)],
        note: None,
    })
    .with_command_id("retry-3");
    assert!(manager.execute_command(command.clone()).success);

    let removed = manager
        .prune_processed_commands(std::time::Duration::from_secs(3600))
        .unwrap();
    assert_eq!(removed, 0);

    // Still inside the retention window, the retry is a no-op
    let retry = manager.execute_command(command);
    assert_eq!(retry.outcome, Some(CommandOutcome::Duplicate));
    assert_eq!(stock_of(&manager, 1), 9);
}

#[test]
fn test_rejected_command_can_be_retried() {
    let manager = create_test_manager();
    let command = cmd(OrderCommandPayload::CreateOrder {
        table_id: 3,
        items: vec![OrderItemInput::new(2, 4)],
        note: None,
    })
    .with_command_id("retry-2");
    assert!(!manager.execute_command(command.clone()).success);

    // Nothing was recorded for the failed attempt
    assert!(!manager.storage().is_command_processed("retry-2").unwrap());
    let resp = manager.execute_command(command);
    assert!(!resp.success);
    assert_eq!(resp.error.unwrap().code, CommandErrorCode::InsufficientStock);
}

#[test]
fn test_channel_versions_follow_commits() {
    let manager = create_test_manager();
    let kitchen_rx = manager.watch_channel(SyncChannel::Kitchen);
    let stock_rx = manager.watch_channel(SyncChannel::Stock);
    assert_eq!(manager.channel_version(SyncChannel::Kitchen), 0);

    let order_id = create_order(&manager, 3, vec![OrderItemInput::new(1, 1)]);
    assert_eq!(manager.channel_version(SyncChannel::Kitchen), 1);
    assert_eq!(manager.channel_version(SyncChannel::Stock), 1);
    assert!(kitchen_rx.has_changed().unwrap());
    assert!(stock_rx.has_changed().unwrap());

    // Kitchen-only change
    let item_id = item_ids(&manager, order_id)[0];
    execute_ok(&manager, OrderCommandPayload::MarkItemReady { item_id });
    assert_eq!(manager.channel_version(SyncChannel::Kitchen), 2);
    assert_eq!(manager.channel_version(SyncChannel::Stock), 1);

    // Persisted versions match the published ones
    assert_eq!(manager.storage().get_version(SyncChannel::Kitchen).unwrap(), 2);
}

#[test]
fn test_rejection_bumps_no_version() {
    let manager = create_test_manager();
    let code = execute_err(
        &manager,
        OrderCommandPayload::CreateOrder {
            table_id: 999,
            items: vec![OrderItemInput::new(1, 1)],
            note: None,
        },
    );
    assert_eq!(code, CommandErrorCode::TableNotFound);
    assert_eq!(code.kind(), FailureKind::Validation);
    assert_eq!(manager.channel_version(SyncChannel::Kitchen), 0);
    assert_eq!(manager.channel_version(SyncChannel::Stock), 0);
    assert_eq!(manager.storage().get_current_sequence().unwrap(), 0);
}

#[test]
fn test_events_are_broadcast_after_commit() {
    let manager = create_test_manager();
    let mut rx = manager.subscribe();

    let order_id = create_order(&manager, 3, vec![OrderItemInput::new(1, 1)]);
    let event = rx.try_recv().unwrap();
    assert_eq!(event.order_id, order_id);
    assert_eq!(event.event_type, OrderEventType::OrderCreated);
    assert_eq!(event.operator_name, "Test Operator");
    assert_eq!(event.sequence, 1);
    assert!(rx.try_recv().is_err());

    execute_err(&manager, OrderCommandPayload::ServeOrder { order_id });
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_adjust_stock_signals_stock_channel() {
    let manager = create_test_manager();
    match execute_ok(
        &manager,
        OrderCommandPayload::AdjustStock {
            product_id: 2,
            delta: 5,
            reason: Some("delivery".to_string()),
        },
    ) {
        CommandOutcome::StockAdjusted { stock, .. } => assert_eq!(stock, 8),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(manager.channel_version(SyncChannel::Stock), 1);
    assert_eq!(manager.channel_version(SyncChannel::Kitchen), 0);

    let board = manager.stock_board().unwrap();
    let bread = board.products.iter().find(|p| p.product_id == 2).unwrap();
    assert_eq!(bread.stock, 8);
}

#[test]
fn test_create_invoice_applies_rules() {
    let manager = create_test_manager().with_rules(EngineRules {
        tax_rate: Decimal::new(10, 2),
    });
    let order_id = create_order(&manager, 3, vec![OrderItemInput::new(1, 2)]);
    execute_ok(&manager, OrderCommandPayload::CompleteOrder { order_id });

    match execute_ok(
        &manager,
        OrderCommandPayload::CreateInvoice {
            order_id,
            discount_percent: Decimal::new(10, 0),
            apply_tax: true,
            customer: Default::default(),
        },
    ) {
        // 10.00 - 10% = 9.00, + 10% tax = 9.90
        CommandOutcome::InvoiceCreated { total, .. } => assert_eq!(total, Decimal::new(990, 2)),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_engine_stats() {
    let manager = create_test_manager();
    create_order(
        &manager,
        3,
        vec![OrderItemInput::new(1, 1), OrderItemInput::new(2, 1)],
    );
    served_order(&manager, 150, vec![OrderItemInput::new(1, 1)]);

    let stats = manager.engine_stats().unwrap();
    assert_eq!(stats.active_orders, 1);
    assert_eq!(stats.pending_items, 2);
    assert_eq!(stats.active_products, 2);
    assert_eq!(stats.unpaid_invoices, 1);
    assert_eq!(stats.storage.order_count, 2);
    assert_eq!(stats.storage.invoice_count, 1);
}

#[test]
fn test_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("comanda.redb");

    let order_id = {
        let manager = OrdersManager::new(&path, EngineRules::default()).unwrap();
        let txn = manager.storage().begin_write().unwrap();
        manager
            .storage()
            .put_product(&txn, &product(1, "Soup", 500, 10))
            .unwrap();
        manager.storage().put_table(&txn, &table(3, 3)).unwrap();
        txn.commit().unwrap();
        create_order(&manager, 3, vec![OrderItemInput::new(1, 2)])
    };

    let manager = OrdersManager::new(&path, EngineRules::default()).unwrap();
    assert_eq!(manager.get_order(order_id).unwrap().unwrap().total, Decimal::new(1000, 2));
    assert_eq!(stock_of(&manager, 1), 8);
    assert_eq!(manager.channel_version(SyncChannel::Kitchen), 1);
    assert_eq!(table_status(&manager, 3), TableStatus::Occupied);
}
