//! Operational store entity and the city reference directory.

use serde::{Deserialize, Serialize};

use pickupmart_core::{CityId, SubjectId};

/// Reference data a store creation depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub active: bool,
}

/// The operational store record the ordering surfaces read.
///
/// `id` is the merchant profile's id reused as a literal shared primary
/// key, not a foreign-key copy. `manager_id` must always resolve to an
/// existing identity; the store repository refuses writes that would break
/// that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: SubjectId,
    pub name: String,
    pub active: bool,
    pub manager_id: SubjectId,
    pub city_id: CityId,
    pub address: String,
    pub image: Option<String>,
}
