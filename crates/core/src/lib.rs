//! Pickupmart Core - Shared types library.
//!
//! This crate provides common types used across all Pickupmart components:
//! - `engine` - Merchant provisioning and consistency engine
//! - `cli` - Command-line tools for migrations and operator jobs
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no
//! service logic. This keeps it lightweight and allows it to be used
//! anywhere, including from future HTTP surfaces.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
