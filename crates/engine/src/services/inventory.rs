//! Inventory ledger: catalog mutations guarded by a field-level audit log.
//!
//! Every individually changed field on a product yields exactly one audit
//! entry, appended in the same guarded operation as the change itself.

use thiserror::Error;
use tracing::{info, instrument, warn};

use pickupmart_core::{AuditAction, Price, ProductId, SubjectId};

use crate::db::{Database, StorageError};
use crate::models::{
    BulkImportOutcome, Product, ProductImage, ProductInput, ProductPatch, SkippedRow,
    StoreProductLink,
};
use crate::services::notifications::{EventPayload, NotificationHub, StoreEvent};

/// Skip reason for rows whose EAN already exists.
const REASON_DUPLICATE_EAN: &str = "Duplicate EAN";

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed input field; reported per item in batch paths.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Uniqueness violation not resolved by an upsert path.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Product or image not found.
    #[error("not found")]
    NotFound,

    /// The store or product a link references does not exist.
    #[error("dependency missing: {0}")]
    DependencyMissing(String),
}

impl From<StorageError> for LedgerError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::NotFound,
            StorageError::Conflict(message) => Self::Conflict(message),
        }
    }
}

/// Catalog service with the append-only audit trail.
#[derive(Debug, Clone)]
pub struct InventoryLedger {
    db: Database,
    hub: NotificationHub,
}

impl InventoryLedger {
    /// Create a ledger over the given database and notification hub.
    #[must_use]
    pub const fn new(db: Database, hub: NotificationHub) -> Self {
        Self { db, hub }
    }

    /// Create a single product and record a CREATE audit entry.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for a malformed row and
    /// `LedgerError::Conflict` for a duplicate EAN.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        input: ProductInput,
        changed_by: &str,
    ) -> Result<Product, LedgerError> {
        validate_row(&input)?;

        let now = chrono::Utc::now();
        let image = input.image.clone();
        let product = Product {
            id: ProductId::generate(),
            name: input.name,
            mrp: input.mrp,
            category: input.category,
            brand: input.brand,
            ean: input.ean,
            image: image.clone(),
            images: image
                .into_iter()
                .map(|url| ProductImage {
                    url,
                    is_primary: true,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        };

        let product = self.db.products().insert(product).await?;
        self.db
            .audit()
            .append(
                product.id,
                AuditAction::Create,
                None,
                None,
                Some(product.name.clone()),
                changed_by,
            )
            .await;
        info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// Import a batch of rows with per-row isolation: a bad row is skipped
    /// with its reason and never aborts the rest of the batch.
    ///
    /// A row whose EAN already exists — in the catalog or earlier in the
    /// same batch — is skipped with reason "Duplicate EAN".
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn bulk_import(
        &self,
        rows: Vec<ProductInput>,
        changed_by: &str,
    ) -> BulkImportOutcome {
        let mut outcome = BulkImportOutcome::default();

        for (index, row) in rows.into_iter().enumerate() {
            let name = (!row.name.is_empty()).then(|| row.name.clone());

            if let Err(err) = validate_row(&row) {
                outcome.skipped.push(SkippedRow {
                    index,
                    name,
                    reason: err.to_string(),
                });
                continue;
            }

            if let Some(ean) = &row.ean
                && self.db.products().find_by_ean(ean).await.is_some()
            {
                outcome.skipped.push(SkippedRow {
                    index,
                    name,
                    reason: REASON_DUPLICATE_EAN.to_string(),
                });
                continue;
            }

            match self.create_product(row, changed_by).await {
                Ok(product) => outcome.created.push(product),
                // A conflict here means the EAN raced into existence within
                // the batch; same skip reason as the pre-check.
                Err(LedgerError::Conflict(_)) => outcome.skipped.push(SkippedRow {
                    index,
                    name,
                    reason: REASON_DUPLICATE_EAN.to_string(),
                }),
                Err(err) => outcome.skipped.push(SkippedRow {
                    index,
                    name,
                    reason: err.to_string(),
                }),
            }
        }

        if !outcome.skipped.is_empty() {
            warn!(
                created = outcome.created.len(),
                skipped = outcome.skipped.len(),
                "bulk import finished with skipped rows"
            );
        }
        outcome
    }

    /// Apply a partial update, appending one UPDATE audit entry per field
    /// whose value actually changed. A no-op patch produces zero entries.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` for an unknown product and
    /// `LedgerError::Conflict` if a changed EAN collides.
    #[instrument(skip(self, patch))]
    pub async fn patch_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
        changed_by: &str,
    ) -> Result<Product, LedgerError> {
        let _guard = self.db.lock_product(id).await;

        let old = self.db.products().get(id).await.ok_or(LedgerError::NotFound)?;
        let mut new = old.clone();

        if let Some(name) = patch.name {
            if name.is_empty() {
                return Err(LedgerError::Validation("name must not be empty".into()));
            }
            new.name = name;
        }
        if let Some(mrp) = patch.mrp {
            new.mrp = mrp;
        }
        if let Some(category) = patch.category {
            if category.is_empty() {
                return Err(LedgerError::Validation(
                    "category must not be empty".into(),
                ));
            }
            new.category = category;
        }
        if let Some(brand) = patch.brand {
            new.brand = brand;
        }
        if let Some(ean) = patch.ean {
            new.ean = ean;
        }

        let changes = diff_fields(&old, &new);
        if changes.is_empty() {
            return Ok(old);
        }

        let updated = self.db.products().update(new).await?;
        for (field, old_value, new_value) in changes {
            self.db
                .audit()
                .append(
                    id,
                    AuditAction::Update,
                    Some(field.to_string()),
                    old_value,
                    new_value,
                    changed_by,
                )
                .await;
        }
        Ok(updated)
    }

    /// Attach an image. The image becomes primary when explicitly asked
    /// for, or automatically when it is the product's only image.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` for an unknown product and
    /// `LedgerError::Conflict` if the URL is already attached.
    #[instrument(skip(self, url))]
    pub async fn add_image(
        &self,
        id: ProductId,
        url: String,
        make_primary: bool,
        changed_by: &str,
    ) -> Result<Product, LedgerError> {
        let _guard = self.db.lock_product(id).await;

        let mut product = self.db.products().get(id).await.ok_or(LedgerError::NotFound)?;
        if product.images.iter().any(|img| img.url == url) {
            return Err(LedgerError::Conflict(format!(
                "image {url} already attached"
            )));
        }

        let is_primary = make_primary || product.images.is_empty();
        if is_primary {
            for img in &mut product.images {
                img.is_primary = false;
            }
            product.image = Some(url.clone());
        }
        product.images.push(ProductImage {
            url: url.clone(),
            is_primary,
        });

        let product = self.db.products().update(product).await?;
        self.db
            .audit()
            .append(
                id,
                AuditAction::AddImage,
                Some("image".to_string()),
                None,
                Some(url),
                changed_by,
            )
            .await;
        Ok(product)
    }

    /// Detach an image. If it was the primary, another remaining image is
    /// promoted (or the mirror goes to `None`) within the same operation;
    /// no intermediate inconsistent state is observable.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if the product or the URL is
    /// unknown.
    #[instrument(skip(self, url))]
    pub async fn remove_image(
        &self,
        id: ProductId,
        url: &str,
        changed_by: &str,
    ) -> Result<Product, LedgerError> {
        let _guard = self.db.lock_product(id).await;

        let mut product = self.db.products().get(id).await.ok_or(LedgerError::NotFound)?;
        let position = product
            .images
            .iter()
            .position(|img| img.url == url)
            .ok_or(LedgerError::NotFound)?;
        let removed = product.images.remove(position);

        if removed.is_primary {
            match product.images.first_mut() {
                Some(promoted) => {
                    promoted.is_primary = true;
                    product.image = Some(promoted.url.clone());
                }
                None => product.image = None,
            }
        }

        let product = self.db.products().update(product).await?;
        self.db
            .audit()
            .append(
                id,
                AuditAction::RemoveImage,
                Some("image".to_string()),
                Some(removed.url),
                None,
                changed_by,
            )
            .await;
        Ok(product)
    }

    /// Delete a product and its store links, recording a DELETE entry.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` for an unknown product.
    #[instrument(skip(self))]
    pub async fn delete_product(
        &self,
        id: ProductId,
        changed_by: &str,
    ) -> Result<(), LedgerError> {
        {
            let _guard = self.db.lock_product(id).await;

            let product = self.db.products().delete_cascade(id).await?;
            self.db
                .audit()
                .append(
                    id,
                    AuditAction::Delete,
                    None,
                    Some(product.name),
                    None,
                    changed_by,
                )
                .await;
        }
        self.db.evict_product(id);
        info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Assign a product to a store, or update price/stock if the
    /// `(store, product, variant)` link already exists. Broadcasts an
    /// inventory change on the store's topic after the write commits.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::DependencyMissing` if either end of the link
    /// does not exist.
    #[instrument(skip(self))]
    pub async fn link_to_store(
        &self,
        store_id: SubjectId,
        product_id: ProductId,
        price: Price,
        stock: i32,
        variant: Option<String>,
    ) -> Result<StoreProductLink, LedgerError> {
        if self.db.stores().get(store_id).await.is_none() {
            return Err(LedgerError::DependencyMissing(format!(
                "store {store_id} not found"
            )));
        }
        if self.db.products().get(product_id).await.is_none() {
            return Err(LedgerError::DependencyMissing(format!(
                "product {product_id} not found"
            )));
        }

        let (link, created) = self
            .db
            .products()
            .upsert_link(store_id, product_id, price, stock, variant)
            .await;
        if created {
            info!(store_id = %store_id, product_id = %product_id, "product linked to store");
        }

        // After commit, never before.
        self.hub.publish(StoreEvent {
            store_id,
            payload: EventPayload::InventoryChanged { product_id },
        });
        Ok(link)
    }
}

/// Required-field validation for a create/import row.
fn validate_row(input: &ProductInput) -> Result<(), LedgerError> {
    if input.name.is_empty() {
        return Err(LedgerError::Validation("name is required".into()));
    }
    if input.category.is_empty() {
        return Err(LedgerError::Validation("category is required".into()));
    }
    if input.mrp.amount <= rust_decimal::Decimal::ZERO {
        return Err(LedgerError::Validation("mrp must be positive".into()));
    }
    Ok(())
}

type FieldChange = (&'static str, Option<String>, Option<String>);

/// Field-level diff between two product states, excluding image fields
/// (those are audited by the image operations themselves).
fn diff_fields(old: &Product, new: &Product) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    if old.name != new.name {
        changes.push((
            "name",
            Some(old.name.clone()),
            Some(new.name.clone()),
        ));
    }
    if old.mrp != new.mrp {
        changes.push((
            "mrp",
            Some(old.mrp.to_string()),
            Some(new.mrp.to_string()),
        ));
    }
    if old.category != new.category {
        changes.push((
            "category",
            Some(old.category.clone()),
            Some(new.category.clone()),
        ));
    }
    if old.brand != new.brand {
        changes.push(("brand", old.brand.clone(), new.brand.clone()));
    }
    if old.ean != new.ean {
        changes.push(("ean", old.ean.clone(), new.ean.clone()));
    }
    changes
}
