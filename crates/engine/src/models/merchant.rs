//! Merchant profile: the admin/legacy-facing merchant business record.
//!
//! The profile is the authoritative source for identity fields (owner name,
//! email) while the store record is authoritative for operational state.
//! Every profile write is expected to pass through the provisioning
//! reactor in the same logical operation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pickupmart_core::{Email, KycStatus, MerchantStatus, SubjectId};

/// A geographic point attached to a merchant's address.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// The merchant business profile, authored by public signup, admin edits,
/// and bulk imports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantProfile {
    /// Shared primary key: also the id of the login identity and the store.
    pub id: SubjectId,
    pub owner_name: String,
    /// Globally unique across profiles and login identities.
    pub email: Email,
    pub phone: Option<String>,
    pub store_name: String,
    /// City name, resolved against the city directory when provisioning.
    pub city: String,
    pub address: String,
    pub geolocation: Option<GeoPoint>,
    pub kyc_status: KycStatus,
    pub status: MerchantStatus,
    pub rating: Option<Decimal>,
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MerchantProfile {
    /// The first photo, which provisioning projects onto `Store.image`.
    #[must_use]
    pub fn primary_photo(&self) -> Option<&str> {
        self.photos.first().map(String::as_str)
    }
}

/// Input for creating a merchant profile.
///
/// The id is supplied by the caller: signup flows pass the id issued by the
/// auth provider so the shared-key invariant holds from the first write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMerchantProfile {
    pub id: SubjectId,
    pub owner_name: String,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<String>,
    pub store_name: String,
    pub city: String,
    pub address: String,
    #[serde(default)]
    pub geolocation: Option<GeoPoint>,
    #[serde(default)]
    pub kyc_status: KycStatus,
    #[serde(default)]
    pub status: MerchantStatus,
    #[serde(default)]
    pub photos: Vec<String>,
}

impl NewMerchantProfile {
    /// Materialize the profile row with creation timestamps.
    #[must_use]
    pub fn into_profile(self, now: DateTime<Utc>) -> MerchantProfile {
        MerchantProfile {
            id: self.id,
            owner_name: self.owner_name,
            email: self.email,
            phone: self.phone,
            store_name: self.store_name,
            city: self.city,
            address: self.address,
            geolocation: self.geolocation,
            kyc_status: self.kyc_status,
            status: self.status,
            rating: None,
            photos: self.photos,
            created_at: now,
            updated_at: now,
        }
    }
}
