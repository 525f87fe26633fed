//! Domain models for the consistency engine.
//!
//! These are plain data structs; the invariants between them (shared
//! primary key, manager resolvability, audit completeness) are enforced by
//! the repositories in [`crate::db`] and the services in
//! [`crate::services`].

pub mod catalog;
pub mod identity;
pub mod merchant;
pub mod order;
pub mod store;

pub use catalog::{
    AuditLogEntry, BulkImportOutcome, Product, ProductImage, ProductInput, ProductPatch,
    SkippedRow, StoreProductLink,
};
pub use identity::Identity;
pub use merchant::{GeoPoint, MerchantProfile, NewMerchantProfile};
pub use order::{NewOrder, Order};
pub use store::{City, Store};
