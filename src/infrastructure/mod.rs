//! Infrastructure layer for external integrations.
//!
//! Implements the storage traits defined by the domain layer.

pub mod persistence;
