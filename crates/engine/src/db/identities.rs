//! Repository for login identities.

use pickupmart_core::{Email, SubjectId};

use super::{Database, StorageError, check_email_unique};
use crate::models::Identity;

/// Repository for identity operations.
pub struct IdentityRepository<'a> {
    db: &'a Database,
}

impl<'a> IdentityRepository<'a> {
    /// Create a new identity repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a new identity.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id already exists or the
    /// email is taken by another identity or merchant profile.
    pub async fn insert(&self, identity: Identity) -> Result<Identity, StorageError> {
        let mut tables = self.db.write().await;
        if tables.identities.contains_key(&identity.id) {
            return Err(StorageError::Conflict(format!(
                "identity {} already exists",
                identity.id
            )));
        }
        check_email_unique(&tables, &identity.email, identity.id)?;
        tables.identities.insert(identity.id, identity.clone());
        Ok(identity)
    }

    /// Replace an existing identity.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the identity doesn't exist and
    /// `StorageError::Conflict` on an email collision.
    pub async fn update(&self, identity: Identity) -> Result<Identity, StorageError> {
        let mut tables = self.db.write().await;
        if !tables.identities.contains_key(&identity.id) {
            return Err(StorageError::NotFound);
        }
        check_email_unique(&tables, &identity.email, identity.id)?;
        tables.identities.insert(identity.id, identity.clone());
        Ok(identity)
    }

    /// Get an identity by id.
    pub async fn get(&self, id: SubjectId) -> Option<Identity> {
        self.db.read().await.identities.get(&id).cloned()
    }

    /// Find an identity by normalized email.
    pub async fn find_by_email(&self, email: &Email) -> Option<Identity> {
        self.db
            .read()
            .await
            .identities
            .values()
            .find(|identity| identity.email == *email)
            .cloned()
    }

    /// List all identities.
    pub async fn list(&self) -> Vec<Identity> {
        let mut identities: Vec<_> = self.db.read().await.identities.values().cloned().collect();
        identities.sort_by_key(|identity| identity.id);
        identities
    }
}
