//! Link store implementations.
//!
//! - [`PgLinkStore`] - PostgreSQL via a bounded SQLx pool
//! - [`MemoryLinkStore`] - in-process store with the same contract

pub mod memory_link_store;
pub mod pg_link_store;

pub use memory_link_store::MemoryLinkStore;
pub use pg_link_store::PgLinkStore;
