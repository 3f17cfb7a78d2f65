//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without I/O. Persistence lives behind
//! [`crate::domain::repositories::UrlRegistry`].
//!
//! # Entity Types
//!
//! - [`UrlRecord`] - The authoritative, persisted mapping between a long URL and a short code
//! - [`NewUrlRecord`] - Input for creating a record
//! - [`UrlProjection`] - The read-relevant fields shared by the registry and cache read paths
//! - [`DeleteFilter`] - Exactly one lookup key for a physical delete

pub mod url_record;

pub use url_record::{DeleteFilter, NewUrlRecord, UniqueField, UrlProjection, UrlRecord};
