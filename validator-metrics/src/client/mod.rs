//! Chain data client.
//!
//! This module reads validator and network state from a Cosmos SDK node's
//! REST API and normalizes it into plain values:
//!
//! - [`RestSource`] is the transport seam (one JSON `GET` per call),
//! - [`HttpSource`] implements it over HTTP with `reqwest`,
//! - [`ChainClient`] holds the query operations and their normalization
//!   rules,
//! - [`chain_metadata`] reads denomination metadata from a chain registry.

pub mod chain_registry;
pub mod error;
pub mod http;
pub mod queries;
mod wire;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde_json::Value;

pub use chain_registry::chain_metadata;
pub use error::ClientError;
pub use http::HttpSource;
pub use queries::{ChainClient, Denomination};

/// Source of JSON documents addressed by path.
///
/// Implementations perform one request per call and report non-success
/// statuses as [`ClientError::Status`] so callers can tell "not found"
/// apart from other failures.
#[async_trait]
pub trait RestSource: Send + Sync {
    async fn get_json(&self, path: &str) -> Result<Value, ClientError>;
}
