//! Repository for products and store product links.

use pickupmart_core::{Price, ProductId, StoreProductLinkId, SubjectId};

use super::{Database, StorageError};
use crate::models::{Product, StoreProductLink};

/// Repository for catalog operations.
pub struct ProductRepository<'a> {
    db: &'a Database,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id already exists or the
    /// EAN is already present in the catalog.
    pub async fn insert(&self, product: Product) -> Result<Product, StorageError> {
        let mut tables = self.db.write().await;
        if tables.products.contains_key(&product.id) {
            return Err(StorageError::Conflict(format!(
                "product {} already exists",
                product.id
            )));
        }
        if let Some(ean) = &product.ean
            && tables
                .products
                .values()
                .any(|existing| existing.ean.as_deref() == Some(ean.as_str()))
        {
            return Err(StorageError::Conflict(format!("EAN {ean} already exists")));
        }
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    /// Replace an existing product.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the product doesn't exist and
    /// `StorageError::Conflict` if the EAN now collides with another
    /// product's.
    pub async fn update(&self, mut product: Product) -> Result<Product, StorageError> {
        let mut tables = self.db.write().await;
        if !tables.products.contains_key(&product.id) {
            return Err(StorageError::NotFound);
        }
        if let Some(ean) = &product.ean
            && tables.products.values().any(|existing| {
                existing.id != product.id && existing.ean.as_deref() == Some(ean.as_str())
            })
        {
            return Err(StorageError::Conflict(format!("EAN {ean} already exists")));
        }
        product.updated_at = chrono::Utc::now();
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    /// Get a product by id.
    pub async fn get(&self, id: ProductId) -> Option<Product> {
        self.db.read().await.products.get(&id).cloned()
    }

    /// Find a product by its EAN barcode.
    pub async fn find_by_ean(&self, ean: &str) -> Option<Product> {
        self.db
            .read()
            .await
            .products
            .values()
            .find(|product| product.ean.as_deref() == Some(ean))
            .cloned()
    }

    /// List all products.
    pub async fn list(&self) -> Vec<Product> {
        let mut products: Vec<_> = self.db.read().await.products.values().cloned().collect();
        products.sort_by_key(|product| product.id);
        products
    }

    /// Delete a product and every store link pointing at it, in one
    /// guarded operation.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the product doesn't exist.
    pub async fn delete_cascade(&self, id: ProductId) -> Result<Product, StorageError> {
        let mut tables = self.db.write().await;
        let product = tables.products.remove(&id).ok_or(StorageError::NotFound)?;
        tables.links.retain(|_, link| link.product_id != id);
        Ok(product)
    }

    // =========================================================================
    // Store links
    // =========================================================================

    /// Upsert a store link keyed by `(store_id, product_id, variant)`.
    ///
    /// Repeating the call with the same triple updates price and stock
    /// rather than erroring, so catalog assignment is idempotent. Returns
    /// the link and whether it was newly created.
    pub async fn upsert_link(
        &self,
        store_id: SubjectId,
        product_id: ProductId,
        price: Price,
        stock: i32,
        variant: Option<String>,
    ) -> (StoreProductLink, bool) {
        let mut tables = self.db.write().await;
        let existing_id = tables
            .links
            .values()
            .find(|link| {
                link.store_id == store_id
                    && link.product_id == product_id
                    && link.variant == variant
            })
            .map(|link| link.id);

        match existing_id {
            Some(id) => {
                // Uniqueness of the triple is preserved by updating in place.
                let link = tables
                    .links
                    .get_mut(&id)
                    .expect("link id was found under the same write guard");
                link.price = price;
                link.stock = stock;
                link.active = true;
                (link.clone(), false)
            }
            None => {
                let link = StoreProductLink {
                    id: StoreProductLinkId::generate(),
                    store_id,
                    product_id,
                    price,
                    stock,
                    active: true,
                    variant,
                };
                tables.links.insert(link.id, link.clone());
                (link, true)
            }
        }
    }

    /// List links for a store.
    pub async fn links_for_store(&self, store_id: SubjectId) -> Vec<StoreProductLink> {
        let mut links: Vec<_> = self
            .db
            .read()
            .await
            .links
            .values()
            .filter(|link| link.store_id == store_id)
            .cloned()
            .collect();
        links.sort_by_key(|link| link.id);
        links
    }

    /// List links for a product across all stores.
    pub async fn links_for_product(&self, product_id: ProductId) -> Vec<StoreProductLink> {
        let mut links: Vec<_> = self
            .db
            .read()
            .await
            .links
            .values()
            .filter(|link| link.product_id == product_id)
            .cloned()
            .collect();
        links.sort_by_key(|link| link.id);
        links
    }
}
