//! Domain layer: entities and storage contracts.
//!
//! - [`entities`] - the ShortLink data model
//! - [`repositories`] - pooled storage traits implemented by infrastructure

pub mod entities;
pub mod repositories;
