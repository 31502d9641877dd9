//! Application layer services.
//!
//! - [`services::dedup_store::DedupStore`] - exactly-once get-or-create and
//!   id lookup over a pooled [`crate::domain::repositories::LinkStore`]

pub mod services;
