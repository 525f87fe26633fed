//! Shared helpers for the Pickupmart integration tests.
//!
//! Everything runs in process against a fresh engine, so tests need no
//! external services. `engine()` hands back a migrated engine with the
//! seeded city directory in place.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use pickupmart_core::{Email, Price, SubjectId};
use pickupmart_engine::models::{NewMerchantProfile, ProductInput};
use pickupmart_engine::{Engine, EngineConfig};

/// A fresh, migrated engine with the no-op payment gateway.
pub async fn engine() -> Engine {
    let e = Engine::new(&EngineConfig::default());
    e.migrate().await;
    e
}

/// A minimal valid merchant profile input in a seeded, active city.
#[must_use]
pub fn merchant_input(store_name: &str, email: &str) -> NewMerchantProfile {
    merchant_input_in_city(store_name, email, "Hyderabad")
}

/// A merchant profile input with an explicit city name.
#[must_use]
pub fn merchant_input_in_city(store_name: &str, email: &str, city: &str) -> NewMerchantProfile {
    NewMerchantProfile {
        id: SubjectId::generate(),
        owner_name: format!("Owner of {store_name}"),
        email: Email::parse(email).unwrap(),
        phone: None,
        store_name: store_name.to_string(),
        city: city.to_string(),
        address: "12 Market Rd".to_string(),
        geolocation: None,
        kyc_status: pickupmart_core::KycStatus::default(),
        status: pickupmart_core::MerchantStatus::default(),
        photos: vec![],
    }
}

/// An INR price with two decimal places, e.g. `inr(19950)` is 199.50.
#[must_use]
pub fn inr(paise: i64) -> Price {
    Price::from_amount(Decimal::new(paise, 2))
}

/// A valid catalog row, optionally carrying an EAN.
#[must_use]
pub fn product_row(name: &str, ean: Option<&str>) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        mrp: inr(9900),
        category: "Grocery".to_string(),
        brand: None,
        ean: ean.map(str::to_string),
        image: None,
    }
}
