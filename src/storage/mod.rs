//! Storage module for multisig transaction persistence

pub mod json_store;
pub mod store;

pub use json_store::{JsonStore, JsonStoreConfig};
pub use store::{StoreError, TransactionStore};
