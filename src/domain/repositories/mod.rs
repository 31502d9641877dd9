//! Repository trait definitions for the domain layer.
//!
//! Storage is split into a pool ([`LinkStore`]) and the connection it hands
//! out ([`LinkConnection`]) so callers hold a resource for exactly one
//! operation. Implementations live in `crate::infrastructure::persistence`;
//! mocks are generated with `mockall` for unit tests.

pub mod link_store;

pub use link_store::{LinkConnection, LinkStore};

#[cfg(test)]
pub use link_store::{MockLinkConnection, MockLinkStore};
