//! Sigvault: multisig transaction coordination service
//!
//! This crate lets the owners of an M-of-N blockchain alias collect
//! signatures for a transaction out-of-band and submit the fully-signed
//! result to a chain node. It features:
//! - Request authentication by recoverable ECDSA signatures (secp256k1)
//! - A single-pending-transaction-per-alias invariant, enforced at the
//!   storage layer
//! - Append-once signature slots per owner
//! - Lazy expiration with a configurable deadline
//! - A REST API for create / list / sign / issue / cancel
//!
//! # Example
//!
//! ```ignore
//! use sigvault::api::{create_router, ApiState};
//! use sigvault::multisig::MultisigCoordinator;
//! use sigvault::node::NodeClient;
//! use sigvault::storage::JsonStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(JsonStore::with_defaults()?);
//! let node = Arc::new(NodeClient::new("http://127.0.0.1:9650"));
//! let coordinator = Arc::new(MultisigCoordinator::new(
//!     1, 0, store, node.clone(), node,
//! ));
//! let app = create_router(ApiState { coordinator });
//! ```

pub mod api;
pub mod chain;
pub mod config;
pub mod crypto;
pub mod multisig;
pub mod node;
pub mod storage;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use chain::SignedTransaction;
pub use config::Config;
pub use crypto::KeyPair;
pub use multisig::{MultisigCoordinator, MultisigTransaction, OwnerSlot};
pub use node::NodeClient;
pub use storage::{JsonStore, JsonStoreConfig};
