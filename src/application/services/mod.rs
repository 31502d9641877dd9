//! Business logic services for the application layer.

pub mod dedup_store;

pub use dedup_store::DedupStore;
