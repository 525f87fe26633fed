//! Catalog mutations and the field-level audit trail.

#![allow(clippy::unwrap_used)]

use pickupmart_core::AuditAction;
use pickupmart_engine::models::{ProductInput, ProductPatch};
use pickupmart_integration_tests::{engine, inr, merchant_input, product_row};

#[tokio::test]
async fn test_bulk_import_skips_duplicate_eans_without_aborting() {
    let engine = engine().await;

    // One EAN already in the catalog, and one repeated inside the batch.
    engine
        .inventory()
        .create_product(product_row("Existing Soap", Some("8901111000010")), "seed")
        .await
        .unwrap();

    let mut rows: Vec<ProductInput> = (0..8)
        .map(|i| product_row(&format!("Item {i}"), Some(&format!("890111100010{i}"))))
        .collect();
    rows.push(product_row("Dup of catalog", Some("8901111000010")));
    rows.push(product_row("Dup in batch", Some("8901111001000")));
    rows[0].ean = Some("8901111001000".to_string());

    let outcome = engine.inventory().bulk_import(rows, "importer").await;

    assert_eq!(outcome.created.len(), 8);
    assert_eq!(outcome.skipped.len(), 2);
    for skip in &outcome.skipped {
        assert_eq!(skip.reason, "Duplicate EAN");
        assert!(skip.name.is_some());
    }

    // One CREATE entry per created row (plus the seed row's).
    let creates = engine
        .db()
        .audit()
        .all()
        .await
        .into_iter()
        .filter(|e| e.action == AuditAction::Create)
        .count();
    assert_eq!(creates, 9);
}

#[tokio::test]
async fn test_invalid_rows_are_skipped_with_their_reason() {
    let engine = engine().await;
    let mut bad = product_row("", None);
    bad.category = String::new();

    let outcome = engine
        .inventory()
        .bulk_import(vec![bad, product_row("Fine", None)], "importer")
        .await;

    assert_eq!(outcome.created.len(), 1);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].index, 0);
    assert!(outcome.skipped[0].name.is_none());
    assert!(outcome.skipped[0].reason.contains("required"));
}

#[tokio::test]
async fn test_patch_yields_one_audit_entry_per_changed_field() {
    let engine = engine().await;
    let product = engine
        .inventory()
        .create_product(product_row("Atta 5kg", None), "admin")
        .await
        .unwrap();

    let patch = ProductPatch {
        name: Some("Atta 10kg".to_string()),
        mrp: Some(inr(52000)),
        brand: Some(Some("Annapurna".to_string())),
        ..ProductPatch::default()
    };
    engine
        .inventory()
        .patch_product(product.id, patch, "admin")
        .await
        .unwrap();

    let updates: Vec<_> = engine
        .db()
        .audit()
        .for_product(product.id)
        .await
        .into_iter()
        .filter(|e| e.action == AuditAction::Update)
        .collect();
    assert_eq!(updates.len(), 3);

    let name_entry = updates.iter().find(|e| e.field.as_deref() == Some("name")).unwrap();
    assert_eq!(name_entry.old_value.as_deref(), Some("Atta 5kg"));
    assert_eq!(name_entry.new_value.as_deref(), Some("Atta 10kg"));
    assert_eq!(name_entry.changed_by, "admin");
}

#[tokio::test]
async fn test_noop_patch_produces_no_audit_entries() {
    let engine = engine().await;
    let product = engine
        .inventory()
        .create_product(product_row("Rice 1kg", None), "admin")
        .await
        .unwrap();
    let before = engine.db().audit().for_product(product.id).await.len();

    // Same values again.
    let patch = ProductPatch {
        name: Some(product.name.clone()),
        mrp: Some(product.mrp),
        ..ProductPatch::default()
    };
    engine
        .inventory()
        .patch_product(product.id, patch, "admin")
        .await
        .unwrap();

    assert_eq!(engine.db().audit().for_product(product.id).await.len(), before);
}

#[tokio::test]
async fn test_primary_image_invariant_holds_across_add_and_remove() {
    let engine = engine().await;
    let product = engine
        .inventory()
        .create_product(product_row("Ghee 500ml", None), "admin")
        .await
        .unwrap();

    let product = engine
        .inventory()
        .add_image(product.id, "https://cdn.example.com/a.jpg".into(), false, "admin")
        .await
        .unwrap();
    // First image becomes primary automatically.
    assert_eq!(product.primary_image().unwrap().url, "https://cdn.example.com/a.jpg");
    assert_eq!(product.image.as_deref(), Some("https://cdn.example.com/a.jpg"));

    let product = engine
        .inventory()
        .add_image(product.id, "https://cdn.example.com/b.jpg".into(), true, "admin")
        .await
        .unwrap();
    assert_eq!(product.primary_image().unwrap().url, "https://cdn.example.com/b.jpg");
    assert_eq!(
        product.images.iter().filter(|i| i.is_primary).count(),
        1,
        "exactly one primary while images exist"
    );

    // Removing the primary promotes the remaining image in the same op.
    let product = engine
        .inventory()
        .remove_image(product.id, "https://cdn.example.com/b.jpg", "admin")
        .await
        .unwrap();
    assert_eq!(product.primary_image().unwrap().url, "https://cdn.example.com/a.jpg");
    assert_eq!(product.image.as_deref(), Some("https://cdn.example.com/a.jpg"));

    let product = engine
        .inventory()
        .remove_image(product.id, "https://cdn.example.com/a.jpg", "admin")
        .await
        .unwrap();
    assert!(product.images.is_empty());
    assert!(product.image.is_none());
}

#[tokio::test]
async fn test_link_to_store_upserts_on_the_same_triple() {
    let engine = engine().await;
    let profile = engine
        .create_merchant(merchant_input("Link Mart", "link@example.com"))
        .await
        .unwrap();
    let product = engine
        .inventory()
        .create_product(product_row("Oil 1L", None), "admin")
        .await
        .unwrap();

    let first = engine
        .inventory()
        .link_to_store(profile.id, product.id, inr(18000), 10, None)
        .await
        .unwrap();
    let second = engine
        .inventory()
        .link_to_store(profile.id, product.id, inr(17500), 25, None)
        .await
        .unwrap();

    assert_eq!(first.id, second.id, "same triple updates in place");
    assert_eq!(second.stock, 25);
    assert_eq!(engine.db().products().links_for_store(profile.id).await.len(), 1);

    // A different variant is a new link.
    engine
        .inventory()
        .link_to_store(profile.id, product.id, inr(9500), 5, Some("500ml".into()))
        .await
        .unwrap();
    assert_eq!(engine.db().products().links_for_store(profile.id).await.len(), 2);
}

#[tokio::test]
async fn test_delete_product_removes_links_and_records_entry() {
    let engine = engine().await;
    let profile = engine
        .create_merchant(merchant_input("Gone Mart", "gone@example.com"))
        .await
        .unwrap();
    let product = engine
        .inventory()
        .create_product(product_row("Discontinued", None), "admin")
        .await
        .unwrap();
    engine
        .inventory()
        .link_to_store(profile.id, product.id, inr(1000), 1, None)
        .await
        .unwrap();

    engine.inventory().delete_product(product.id, "admin").await.unwrap();

    assert!(engine.db().products().get(product.id).await.is_none());
    assert!(engine.db().products().links_for_store(profile.id).await.is_empty());
    let deletes = engine
        .db()
        .audit()
        .for_product(product.id)
        .await
        .into_iter()
        .filter(|e| e.action == AuditAction::Delete)
        .count();
    assert_eq!(deletes, 1);
}
