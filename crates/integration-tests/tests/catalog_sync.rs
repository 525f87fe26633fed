//! Store-to-merchant backfill tests.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use pickupmart_core::{Email, KycStatus, MerchantStatus, Role, SubjectId};
use pickupmart_engine::models::{Identity, Store};
use pickupmart_engine::services::SyncError;
use pickupmart_integration_tests::{engine, merchant_input};

#[tokio::test]
async fn test_backfill_preserves_admin_owned_fields() {
    let engine = engine().await;
    let mut profile = engine
        .create_merchant(merchant_input("Sunrise Stores", "sunrise@example.com"))
        .await
        .unwrap();

    // Admin approves KYC and a rating accrues; neither comes from the store.
    profile.kyc_status = KycStatus::Approved;
    profile.rating = Some(Decimal::new(45, 1));
    engine.update_merchant(profile.clone()).await.unwrap();

    // The store is renamed, relocated, and paused on the operational side.
    let mut store = engine.db().stores().get(profile.id).await.unwrap();
    store.name = "Sunrise Stores HSR".to_string();
    store.active = false;
    store.address = "99 New Bazaar Rd".to_string();
    engine.db().stores().update(store).await.unwrap();

    let synced = engine
        .catalog_sync()
        .sync_store_to_merchant(profile.id)
        .await
        .unwrap();

    assert_eq!(synced.store_name, "Sunrise Stores HSR");
    assert_eq!(synced.status, MerchantStatus::Inactive);
    assert_eq!(synced.address, "99 New Bazaar Rd");
    assert_eq!(synced.kyc_status, KycStatus::Approved);
    assert_eq!(synced.rating, Some(Decimal::new(45, 1)));
}

#[tokio::test]
async fn test_backfill_creates_profile_for_standalone_store() {
    let engine = engine().await;

    // A store created directly on the operational side, no profile yet.
    let id = SubjectId::generate();
    engine
        .db()
        .identities()
        .insert(Identity::provisioned_merchant(
            id,
            Email::parse("standalone@example.com").unwrap(),
            "Dev Kumar".to_string(),
        ))
        .await
        .unwrap();
    let city = engine.db().cities().find_by_name("Pune").await.unwrap();
    engine
        .db()
        .stores()
        .insert(Store {
            id,
            name: "Dev General Store".to_string(),
            active: true,
            manager_id: id,
            city_id: city.id,
            address: "3 FC Rd".to_string(),
            image: None,
        })
        .await
        .unwrap();

    let profile = engine
        .catalog_sync()
        .sync_store_to_merchant(id)
        .await
        .unwrap();

    assert_eq!(profile.id, id);
    assert_eq!(profile.store_name, "Dev General Store");
    assert_eq!(profile.owner_name, "Dev Kumar");
    assert_eq!(profile.city, "Pune");
    assert_eq!(profile.kyc_status, KycStatus::Pending);
    assert!(profile.rating.is_none());
}

#[tokio::test]
async fn test_round_trip_converges() {
    let engine = engine().await;
    let profile = engine
        .create_merchant(merchant_input("Loop Mart", "loop@example.com"))
        .await
        .unwrap();

    let synced = engine
        .catalog_sync()
        .sync_store_to_merchant(profile.id)
        .await
        .unwrap();

    assert_eq!(synced.store_name, profile.store_name);
    assert_eq!(synced.owner_name, profile.owner_name);
    assert_eq!(synced.email, profile.email);
    assert_eq!(synced.status, profile.status);
    assert_eq!(synced.kyc_status, profile.kyc_status);
}

#[tokio::test]
async fn test_sync_unknown_store_errors() {
    let engine = engine().await;
    let err = engine
        .catalog_sync()
        .sync_store_to_merchant(SubjectId::generate())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::StoreNotFound(_)));
}

#[tokio::test]
async fn test_created_profile_role_is_merchant() {
    let engine = engine().await;
    let profile = engine
        .create_merchant(merchant_input("Role Mart", "role@example.com"))
        .await
        .unwrap();
    let identity = engine.db().identities().get(profile.id).await.unwrap();
    assert_eq!(identity.role, Role::Merchant);
}
