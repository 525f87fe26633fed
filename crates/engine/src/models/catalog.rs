//! Product catalog, per-store inventory links, and the audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pickupmart_core::{AuditAction, AuditEntryId, Price, ProductId, StoreProductLinkId, SubjectId};

/// A catalog image with its primary flag.
///
/// Exactly one image is primary whenever any image exists;
/// `Product.image` mirrors the primary image's URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    pub is_primary: bool,
}

/// A catalog product shared across stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Maximum retail price printed on the packaging.
    pub mrp: Price,
    pub category: String,
    pub brand: Option<String>,
    /// Barcode; unique across the catalog when present.
    pub ean: Option<String>,
    /// Mirror of the primary image URL, kept in lockstep with `images`.
    pub image: Option<String>,
    pub images: Vec<ProductImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The image currently marked primary.
    #[must_use]
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images.iter().find(|img| img.is_primary)
    }
}

/// One row of a product create or bulk import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub mrp: Price,
    pub category: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub ean: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A partial product update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub mrp: Option<Price>,
    pub category: Option<String>,
    pub brand: Option<Option<String>>,
    pub ean: Option<Option<String>>,
}

impl ProductPatch {
    /// Whether the patch carries no fields at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.mrp.is_none()
            && self.category.is_none()
            && self.brand.is_none()
            && self.ean.is_none()
    }
}

/// A row rejected during bulk import, kept next to the successes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// Zero-based index of the row in the submitted batch.
    pub index: usize,
    pub name: Option<String>,
    pub reason: String,
}

/// Result of a bulk import: per-row isolation means both lists can be
/// non-empty.
#[derive(Debug, Clone, Default)]
pub struct BulkImportOutcome {
    pub created: Vec<Product>,
    pub skipped: Vec<SkippedRow>,
}

/// A product's assignment to a store, with store-local price and stock.
///
/// Unique on `(store_id, product_id, variant)`; re-linking the same triple
/// updates price and stock instead of erroring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreProductLink {
    pub id: StoreProductLinkId,
    pub store_id: SubjectId,
    pub product_id: ProductId,
    pub price: Price,
    pub stock: i32,
    pub active: bool,
    pub variant: Option<String>,
}

/// Append-only record of a single catalog change.
///
/// Field-level updates produce one entry per changed field; entries are
/// never mutated or deleted after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: AuditEntryId,
    pub product_id: ProductId,
    pub action: AuditAction,
    pub field: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub changed_by: String,
    pub at: DateTime<Utc>,
}
