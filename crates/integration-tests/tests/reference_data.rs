//! Supplier, category and product maintenance against a real database.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rust_decimal::Decimal;

use stockroom_admin::error::AppError;
use stockroom_admin::models::{CategoryInput, CreateProductInput, SupplierFilter};
use stockroom_integration_tests::{TestContext, supplier_input, unique_suffix};

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_duplicate_supplier_mobile_is_a_conflict() {
    let ctx = TestContext::new().await;
    let service = ctx.reference();

    let mut input = supplier_input(&unique_suffix());
    input.mobile = ctx.supplier.mobile.clone();

    let err = service.create_supplier(&ctx.actor, &input).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(ref m) if m.contains("mobile")));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_deleted_supplier_frees_its_mobile() {
    let ctx = TestContext::new().await;
    let service = ctx.reference();

    service
        .delete_supplier(&ctx.actor, ctx.supplier.id)
        .await
        .unwrap();

    let mut input = supplier_input(&unique_suffix());
    input.mobile = ctx.supplier.mobile.clone();
    let replacement = service.create_supplier(&ctx.actor, &input).await.unwrap();
    assert_ne!(replacement.id, ctx.supplier.id);

    let err = service.get_supplier(ctx.supplier.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_supplier_search_matches_code_case_insensitively() {
    let ctx = TestContext::new().await;
    let service = ctx.reference();

    let filter = SupplierFilter {
        search: Some(format!("  {}  ", ctx.supplier.code.to_lowercase())),
        ..SupplierFilter::default()
    };
    let page = service.list_suppliers(&filter).await.unwrap();

    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].id, ctx.supplier.id);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_category_names_are_unique() {
    let ctx = TestContext::new().await;
    let service = ctx.reference();

    let input = CategoryInput {
        name: ctx.categories[0].name.clone(),
        description: Some("again".to_string()),
    };
    let err = service.create_category(&ctx.actor, &input).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_product_gets_a_sku_and_is_found_by_it() {
    let ctx = TestContext::new().await;
    let service = ctx.reference();

    let product = service
        .create_product(
            &ctx.actor,
            &CreateProductInput {
                name: "Desk lamp".to_string(),
                category_id: ctx.category(),
                unit_price: Decimal::new(4999, 2),
            },
        )
        .await
        .unwrap();

    assert!(product.sku.starts_with("SKU-"));

    let found = service.get_product(&product.sku).await.unwrap();
    assert_eq!(found.id, product.id);
    assert_eq!(found.unit_price, Decimal::new(4999, 2));
}
