//! Drift sweep: repairing raw profile writes and reporting orphans.

#![allow(clippy::unwrap_used)]

use pickupmart_core::{Email, SubjectId};
use pickupmart_engine::models::{Identity, Store};
use pickupmart_integration_tests::{engine, merchant_input, merchant_input_in_city};

#[tokio::test]
async fn test_sweep_repairs_profiles_that_bypassed_provisioning() {
    let engine = engine().await;
    let now = chrono::Utc::now();

    // Legacy-import style: profiles written straight to storage.
    for (name, email) in [
        ("Raw Mart One", "raw1@example.com"),
        ("Raw Mart Two", "raw2@example.com"),
    ] {
        let profile = merchant_input(name, email).into_profile(now);
        engine.db().merchants().upsert(profile).await.unwrap();
    }

    let report = engine.reconciliation().run_once().await;
    assert_eq!(report.examined, 2);
    assert_eq!(report.repaired.len(), 2);
    assert!(report.failed.is_empty());
    assert!(report.orphan_stores.is_empty());

    for profile in engine.merchants().await {
        assert!(engine.db().identities().get(profile.id).await.is_some());
        let store = engine.db().stores().get(profile.id).await.unwrap();
        assert_eq!(store.name, profile.store_name);
    }

    // A second sweep finds nothing to do.
    let second = engine.reconciliation().run_once().await;
    assert_eq!(second.examined, 2);
    assert!(second.is_clean());
}

#[tokio::test]
async fn test_sweep_reports_orphan_stores_without_touching_them() {
    let engine = engine().await;

    let id = SubjectId::generate();
    engine
        .db()
        .identities()
        .insert(Identity::provisioned_merchant(
            id,
            Email::parse("orphan@example.com").unwrap(),
            "Orphan Owner".to_string(),
        ))
        .await
        .unwrap();
    let city = engine.db().cities().find_by_name("Chennai").await.unwrap();
    engine
        .db()
        .stores()
        .insert(Store {
            id,
            name: "Orphan Store".to_string(),
            active: true,
            manager_id: id,
            city_id: city.id,
            address: "9 Beach Rd".to_string(),
            image: None,
        })
        .await
        .unwrap();

    let report = engine.reconciliation().run_once().await;
    assert_eq!(report.orphan_stores, vec![id]);
    // Reported, not repaired or deleted.
    assert!(engine.db().stores().get(id).await.is_some());
    assert!(engine.merchant(id).await.is_none());
}

#[tokio::test]
async fn test_one_failing_merchant_does_not_abort_the_sweep() {
    let engine = engine().await;
    let now = chrono::Utc::now();

    let bad = merchant_input_in_city("Nowhere Mart", "nowhere@example.com", "Atlantis")
        .into_profile(now);
    let bad_id = bad.id;
    engine.db().merchants().upsert(bad).await.unwrap();

    let good = merchant_input("Somewhere Mart", "somewhere@example.com").into_profile(now);
    let good_id = good.id;
    engine.db().merchants().upsert(good).await.unwrap();

    let report = engine.reconciliation().run_once().await;
    assert_eq!(report.examined, 2);
    assert_eq!(report.repaired, vec![good_id]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, bad_id);
    assert!(report.failed[0].1.contains("Atlantis"));

    // The failing merchant got no partial derivation.
    assert!(engine.db().stores().get(bad_id).await.is_none());
    assert!(engine.db().stores().get(good_id).await.is_some());
}
