//! Blockchain node collaborators
//!
//! The coordinator talks to the chain node for exactly two things:
//! resolving a multisig alias to its owner set, and broadcasting a
//! fully-signed transaction. Both are expressed as traits so the
//! coordinator can be constructed with test doubles.

pub mod client;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub use client::NodeClient;

/// Errors from node communication
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("could not find alias info from node - alias does not exist")]
    AliasNotFound,
    #[error("Node RPC error: {0}")]
    Rpc(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Owner set and threshold of a multisig alias, as reported by the node
///
/// Fetched fresh on every create call; never cached.
#[derive(Clone, Debug, Deserialize)]
pub struct AliasInfo {
    #[serde(default)]
    pub memo: String,
    pub addresses: Vec<String>,
    /// String-encoded integer, parsed by the coordinator
    pub threshold: String,
}

/// Resolves an alias to its current owner set and threshold
#[async_trait]
pub trait AliasResolver: Send + Sync {
    async fn get_alias_info(&self, alias: &str) -> Result<AliasInfo, NodeError>;
}

/// Broadcasts a fully-signed transaction to the chain
#[async_trait]
pub trait NodeGateway: Send + Sync {
    /// Submit the signed bytes; returns the chain transaction id
    async fn issue_tx(&self, signed_tx_bytes: &[u8]) -> Result<String, NodeError>;
}
