//! In-process request/reply gateway.
//!
//! Callers hold a cloneable [`GatewayClient`]; a single consumer loop
//! ([`run_gateway`]) receives [`Envelope`]s and answers each one exactly once
//! with either a [`LinkReply`] or a typed [`Failure`].

pub mod client;
pub mod gateway;
pub mod message;

pub use client::{GatewayClient, SendError};
pub use gateway::{Gateway, run_gateway};
pub use message::{Address, Envelope, Failure, FailureCode, LinkReply, ReplyResult};
