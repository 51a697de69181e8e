//! Transaction store contract
//!
//! Durable storage of multisig transactions and their per-owner
//! signature slots. Every mutation is atomic; conditional updates are
//! decided by the store itself so concurrent callers cannot race past
//! the in-memory checks of the coordinator.

use thiserror::Error;

use crate::multisig::MultisigTransaction;

/// Storage errors, distinct from empty query results
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("A pending transaction already exists for this alias")]
    PendingExists,
    #[error("A transaction with this id already exists")]
    DuplicateId,
}

/// Durable, transactional storage for multisig transactions
///
/// "Pending" throughout means: no chain transaction id and not expired.
/// Read paths only surface pending rows; issued and expired transactions
/// are invisible to the coordination flow.
pub trait TransactionStore: Send + Sync {
    /// Whether a pending transaction exists for `(alias, chain_id)`
    fn pending_alias_exists(&self, alias: &str, chain_id: &str) -> Result<bool, StoreError>;

    /// Insert a transaction and all its owner slots as one atomic unit
    ///
    /// Enforces the single-pending-per-alias invariant and id uniqueness
    /// under the store's own lock. Assigns `created_at`. Returns the id.
    fn create(&self, tx: MultisigTransaction) -> Result<String, StoreError>;

    /// Fetch a pending transaction by id
    fn get_by_id(&self, id: &str) -> Result<Option<MultisigTransaction>, StoreError>;

    /// Fetch the pending transactions for an alias that `owner`
    /// participates in, ordered by creation time
    fn get_for_alias(
        &self,
        alias: &str,
        owner: &str,
    ) -> Result<Vec<MultisigTransaction>, StoreError>;

    /// Fill an owner's signature slot, only if it is still empty
    ///
    /// Returns `false` when no pending transaction matches or the slot
    /// was already filled.
    fn add_signature(&self, id: &str, address: &str, signature: &str)
        -> Result<bool, StoreError>;

    /// Record the chain transaction id, only if none is set yet
    fn set_chain_tx_id(&self, id: &str, chain_tx_id: &str) -> Result<bool, StoreError>;

    /// Remove a transaction; returns whether a row was removed
    fn delete(&self, id: &str) -> Result<bool, StoreError>;
}
