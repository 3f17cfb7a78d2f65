//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations. Implementations live in
//! `crate::infrastructure::persistence`; mock implementations are generated via
//! `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`UrlRegistry`] - URL record storage with uniqueness enforcement

pub mod url_registry;

pub use url_registry::{RegistryError, RegistryResult, UrlRegistry};

#[cfg(test)]
pub use url_registry::MockUrlRegistry;
