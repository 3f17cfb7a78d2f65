//! Registry implementations.
//!
//! - [`PgUrlRegistry`] - PostgreSQL storage; uniqueness enforced by named constraints
//! - [`MemoryUrlRegistry`] - In-process storage with the same uniqueness guarantees

pub mod memory_url_registry;
pub mod pg_url_registry;

pub use memory_url_registry::MemoryUrlRegistry;
pub use pg_url_registry::PgUrlRegistry;
