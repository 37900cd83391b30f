//! Purchase order lifecycle against a real database.
//!
//! Run with `cargo test -p stockroom-integration-tests -- --ignored`.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rust_decimal::Decimal;

use stockroom_admin::db::TransactionHistoryRepository;
use stockroom_admin::error::AppError;
use stockroom_admin::models::{
    CreatePurchaseOrderInput, CreatedPurchaseOrder, OrderFilter, ReceiptLineInput, ReceiptOutcome,
    RecordReceiptInput,
};
use stockroom_admin::services::PurchaseOrderService;
use stockroom_core::identifiers::PurchaseOrderNumber;
use stockroom_core::{CategoryId, InstanceStatus, LineItemId, LineItemStatus};
use stockroom_integration_tests::{TEST_DEADLINE, TestContext, unique_suffix};

fn delivery_line(
    ctx: &TestContext,
    line_item_id: LineItemId,
    unit_price: i64,
    (ordered, received, rejected): (i32, i32, i32),
) -> ReceiptLineInput {
    ReceiptLineInput {
        line_item_id: Some(line_item_id),
        category_id: ctx.category(),
        description: format!("Line {line_item_id}"),
        ordered_quantity: ordered,
        received_quantity: received,
        rejected_quantity: rejected,
        unit_price: Decimal::from(unit_price),
    }
}

fn receipt_for(
    ctx: &TestContext,
    line_item_id: LineItemId,
    invoice: &str,
    counts: (i32, i32, i32),
) -> RecordReceiptInput {
    RecordReceiptInput {
        supplier_id: ctx.supplier.id,
        branch_id: ctx.branch.id,
        invoice_number: invoice.to_string(),
        total_amount: Decimal::from(50 * counts.1),
        idempotency_key: None,
        lines: vec![delivery_line(ctx, line_item_id, 50, counts)],
    }
}

async fn count_rows(ctx: &TestContext, sql: &str, id: i32) -> i64 {
    sqlx::query_scalar(sql)
        .bind(id)
        .fetch_one(&ctx.pool)
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_create_stores_every_line_under_the_order() {
    let ctx = TestContext::new().await;
    let service = ctx.purchase_orders();

    let created = service
        .create_purchase_order(&ctx.actor, &ctx.order_input(&[(50, 5), (20, 3), (8, 10)]))
        .await
        .unwrap();

    assert_eq!(created.line_item_ids.len(), 3);
    assert!(PurchaseOrderNumber::parse(&created.order_number).is_ok());

    let view = service.get_order_detail(&created.order_number).await.unwrap();
    assert_eq!(view.id, created.id);
    assert_eq!(view.supplier.id, ctx.supplier.id);
    assert_eq!(view.branch.id, ctx.branch.id);
    assert_eq!(view.summary.sub_total, Decimal::from(390));
    assert!(!view.invoice_recorded);

    let line_ids: Vec<_> = view.line_items.iter().map(|l| l.id).collect();
    assert_eq!(line_ids, created.line_item_ids);
    assert!(view.line_items.iter().all(|l| l.purchase_order_id == created.id));
    assert!(view.line_items.iter().all(|l| l.status.is_none()));
    assert_eq!(view.line_items[0].line_total, Decimal::from(250));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_parallel_creates_get_distinct_numbers() {
    let ctx = TestContext::new().await;
    let input = ctx.order_input(&[(10, 1)]);

    let results = create_concurrently(&ctx, &input, 8).await;

    let mut numbers: Vec<String> = results.into_iter().map(|c| c.order_number).collect();
    let total = numbers.len();
    numbers.sort();
    numbers.dedup();
    assert_eq!(numbers.len(), total);
}

async fn create_concurrently(
    ctx: &TestContext,
    input: &CreatePurchaseOrderInput,
    n: usize,
) -> Vec<CreatedPurchaseOrder> {
    let mut handles = Vec::with_capacity(n);
    for _ in 0..n {
        let pool = ctx.pool.clone();
        let actor = ctx.actor;
        let input = input.clone();
        handles.push(tokio::spawn(async move {
            PurchaseOrderService::new(&pool, TEST_DEADLINE)
                .create_purchase_order(&actor, &input)
                .await
        }));
    }

    let mut created = Vec::with_capacity(n);
    for handle in handles {
        created.push(handle.await.unwrap().unwrap());
    }
    created
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_bad_category_rolls_back_the_whole_order() {
    let ctx = TestContext::new().await;
    let service = ctx.purchase_orders();

    let mut input = ctx.order_input(&[(10, 1), (10, 1), (10, 1)]);
    input.line_items[1].category_id = CategoryId::new(i32::MAX);

    let filter = OrderFilter {
        supplier_id: Some(ctx.supplier.id),
        ..OrderFilter::default()
    };

    let err = service
        .create_purchase_order(&ctx.actor, &input)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref m) if m == "category not found"));

    let page = service.list_orders(&filter).await.unwrap();
    assert_eq!(page.total_count, 0);
    assert!(page.items.is_empty());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_receipt_materializes_accepted_then_rejected_instances() {
    let ctx = TestContext::new().await;
    let service = ctx.purchase_orders();

    let created = service
        .create_purchase_order(&ctx.actor, &ctx.order_input(&[(50, 7)]))
        .await
        .unwrap();

    let outcome = service
        .record_receipt(
            &ctx.actor,
            &created.order_number,
            &receipt_for(&ctx, created.line_item_ids[0], "INV-1001", (7, 5, 2)),
        )
        .await
        .unwrap();

    let ReceiptOutcome::Recorded {
        receipt_id,
        line_ids,
        instance_count,
    } = outcome
    else {
        panic!("first submission should be recorded");
    };
    assert_eq!(line_ids.len(), 1);
    assert_eq!(instance_count, 7);

    let detail = service.get_receipt_instances(receipt_id).await.unwrap();
    assert_eq!(detail.receipt.invoice_number, "INV-1001");
    assert_eq!(detail.lines[0].status, LineItemStatus::Partial);
    assert_eq!(detail.lines[0].accepted_total, Decimal::from(250));

    let serials: Vec<i32> = detail.instances.iter().map(|i| i.serial_no).collect();
    assert_eq!(serials, (1..=7).collect::<Vec<_>>());
    assert!(detail.instances[..5].iter().all(|i| i.status == InstanceStatus::Accepted));
    assert!(detail.instances[5..].iter().all(|i| i.status == InstanceStatus::Rejected));

    let view = service.get_order_detail(&created.order_number).await.unwrap();
    assert!(view.invoice_recorded);
    assert_eq!(view.line_items[0].accepted_quantity, 5);
    assert_eq!(view.line_items[0].rejected_quantity, 2);
    assert_eq!(view.line_items[0].status, Some(LineItemStatus::Partial));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_replayed_receipt_writes_nothing() {
    let ctx = TestContext::new().await;
    let service = ctx.purchase_orders();

    let created = service
        .create_purchase_order(&ctx.actor, &ctx.order_input(&[(50, 5)]))
        .await
        .unwrap();

    let mut input = receipt_for(&ctx, created.line_item_ids[0], "INV-2001", (5, 3, 0));
    input.idempotency_key = Some(unique_suffix());

    let first = service
        .record_receipt(&ctx.actor, &created.order_number, &input)
        .await
        .unwrap();
    let second = service
        .record_receipt(&ctx.actor, &created.order_number, &input)
        .await
        .unwrap();

    assert!(!first.is_replay());
    assert_eq!(
        second,
        ReceiptOutcome::Replayed {
            receipt_id: first.receipt_id()
        }
    );

    let receipt_id = first.receipt_id().as_i32();
    let lines = count_rows(
        &ctx,
        "SELECT COUNT(*) FROM inventory.receipt_line WHERE receipt_id = $1",
        receipt_id,
    )
    .await;
    let instances = count_rows(
        &ctx,
        "SELECT COUNT(*) FROM inventory.product_instance pi \
         JOIN inventory.receipt_line rl ON rl.id = pi.receipt_line_id \
         WHERE rl.receipt_id = $1",
        receipt_id,
    )
    .await;
    assert_eq!(lines, 1);
    assert_eq!(instances, 3);

    let view = service.get_order_detail(&created.order_number).await.unwrap();
    assert_eq!(view.line_items[0].accepted_quantity, 3);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_receipts_cannot_exceed_ordered_quantity() {
    let ctx = TestContext::new().await;
    let service = ctx.purchase_orders();

    let created = service
        .create_purchase_order(&ctx.actor, &ctx.order_input(&[(50, 5)]))
        .await
        .unwrap();
    let line = created.line_item_ids[0];

    service
        .record_receipt(
            &ctx.actor,
            &created.order_number,
            &receipt_for(&ctx, line, "INV-3001", (5, 4, 0)),
        )
        .await
        .unwrap();

    let err = service
        .record_receipt(
            &ctx.actor,
            &created.order_number,
            &receipt_for(&ctx, line, "INV-3002", (5, 2, 0)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let order_id = created.id.as_i32();
    let rejected_headers = count_rows(
        &ctx,
        "SELECT COUNT(*) FROM inventory.receipt \
         WHERE purchase_order_id = $1 AND invoice_number = 'INV-3002'",
        order_id,
    )
    .await;
    let instances = count_rows(
        &ctx,
        "SELECT COUNT(*) FROM inventory.product_instance pi \
         JOIN inventory.receipt_line rl ON rl.id = pi.receipt_line_id \
         JOIN inventory.receipt r ON r.id = rl.receipt_id \
         WHERE r.purchase_order_id = $1",
        order_id,
    )
    .await;
    assert_eq!(rejected_headers, 0);
    assert_eq!(instances, 4);

    let view = service.get_order_detail(&created.order_number).await.unwrap();
    assert_eq!(view.line_items[0].accepted_quantity, 4);
    assert_eq!(view.line_items[0].rejected_quantity, 0);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_receipt_for_another_supplier_is_rejected() {
    let ctx = TestContext::new().await;
    let other = TestContext::new().await;
    let service = ctx.purchase_orders();

    let created = service
        .create_purchase_order(&ctx.actor, &ctx.order_input(&[(50, 5)]))
        .await
        .unwrap();

    let mut input = receipt_for(&ctx, created.line_item_ids[0], "INV-4001", (5, 5, 0));
    input.supplier_id = other.supplier.id;

    let err = service
        .record_receipt(&ctx.actor, &created.order_number, &input)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(ref m) if m.contains("supplier")));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_list_orders_pages_with_total_count() {
    let ctx = TestContext::new().await;
    let service = ctx.purchase_orders();

    let mut created_ids = Vec::new();
    for _ in 0..12 {
        let created = service
            .create_purchase_order(&ctx.actor, &ctx.order_input(&[(10, 1)]))
            .await
            .unwrap();
        created_ids.push(created.id);
    }

    let filter = OrderFilter {
        supplier_id: Some(ctx.supplier.id),
        page: Some(2),
        page_size: Some(10),
        ..OrderFilter::default()
    };
    let page = service.list_orders(&filter).await.unwrap();

    assert_eq!(page.total_count, 12);
    assert_eq!(page.page, 2);
    assert_eq!(page.items.len(), 2);
    let page_ids: Vec<_> = page.items.iter().map(|o| o.id).collect();
    assert_eq!(page_ids, created_ids[10..12]);
    assert!(page.items.iter().all(|o| o.supplier.id == ctx.supplier.id));
    assert!(page.items.iter().all(|o| o.line_items.len() == 1));

    let by_name = OrderFilter {
        search: Some(ctx.supplier.name.to_uppercase()),
        ..OrderFilter::default()
    };
    assert_eq!(service.list_orders(&by_name).await.unwrap().total_count, 12);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_history_records_create_receive_and_delete() {
    let ctx = TestContext::new().await;
    let service = ctx.purchase_orders();

    let created = service
        .create_purchase_order(&ctx.actor, &ctx.order_input(&[(50, 2)]))
        .await
        .unwrap();
    service
        .record_receipt(
            &ctx.actor,
            &created.order_number,
            &receipt_for(&ctx, created.line_item_ids[0], "INV-5001", (2, 2, 0)),
        )
        .await
        .unwrap();
    service
        .soft_delete_order(&ctx.actor, &created.order_number)
        .await
        .unwrap();

    let entries = TransactionHistoryRepository::new(&ctx.pool)
        .for_subject(&created.order_number)
        .await
        .unwrap();
    let texts: Vec<&str> = entries.iter().map(|e| e.data.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            format!("PO Created: {}", created.order_number),
            format!("PO Received: {}", created.order_number),
            format!("PO Deleted: {}", created.order_number),
        ]
    );
    assert!(entries.iter().all(|e| e.actor_id == ctx.actor.id));

    let err = service
        .get_order_detail(&created.order_number)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_two_line_delivery_with_partial_rejection() {
    let ctx = TestContext::new().await;
    let service = ctx.purchase_orders();

    let created = service
        .create_purchase_order(&ctx.actor, &ctx.order_input(&[(100, 10), (50, 5)]))
        .await
        .unwrap();

    let input = RecordReceiptInput {
        supplier_id: ctx.supplier.id,
        branch_id: ctx.branch.id,
        invoice_number: "INV-6001".to_string(),
        total_amount: Decimal::from(1150),
        idempotency_key: None,
        lines: vec![
            delivery_line(&ctx, created.line_item_ids[0], 100, (10, 10, 0)),
            delivery_line(&ctx, created.line_item_ids[1], 50, (5, 3, 2)),
        ],
    };

    let outcome = service
        .record_receipt(&ctx.actor, &created.order_number, &input)
        .await
        .unwrap();
    let detail = service
        .get_receipt_instances(outcome.receipt_id())
        .await
        .unwrap();

    let (first, second) = (&detail.lines[0], &detail.lines[1]);
    assert_eq!(first.status, LineItemStatus::Accepted);
    assert_eq!(first.accepted_total, Decimal::from(1000));
    assert_eq!(second.status, LineItemStatus::Partial);
    assert_eq!(second.accepted_total, Decimal::from(150));

    let first_instances: Vec<_> = detail
        .instances
        .iter()
        .filter(|i| i.receipt_line_id == first.id)
        .collect();
    assert_eq!(first_instances.len(), 10);
    assert!(first_instances.iter().all(|i| i.status == InstanceStatus::Accepted));

    let second_instances: Vec<(i32, InstanceStatus)> = detail
        .instances
        .iter()
        .filter(|i| i.receipt_line_id == second.id)
        .map(|i| (i.serial_no, i.status))
        .collect();
    assert_eq!(
        second_instances,
        vec![
            (1, InstanceStatus::Accepted),
            (2, InstanceStatus::Accepted),
            (3, InstanceStatus::Accepted),
            (4, InstanceStatus::Rejected),
            (5, InstanceStatus::Rejected),
        ]
    );
}
