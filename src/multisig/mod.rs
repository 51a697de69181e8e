//! Multisig transaction coordination
//!
//! Implements M-of-N signature collection for alias transactions: any
//! owner creates a pending transaction, the remaining owners add their
//! signatures out-of-band, and any owner submits the fully-signed
//! result for broadcast.
//!
//! # Example
//!
//! ```ignore
//! use sigvault::multisig::{CreateTxArgs, MultisigCoordinator};
//!
//! let coordinator = MultisigCoordinator::new(network_id, 0, store, resolver, gateway);
//!
//! // Any owner proposes a transaction for the alias
//! let tx = coordinator.create_transaction(&args).await?;
//!
//! // Other owners add their signatures
//! coordinator.sign_transaction(&tx.id, &sign_args)?;
//!
//! // Once the threshold is met off-chain, any owner issues it
//! let chain_tx_id = coordinator.issue_transaction(&issue_args).await?;
//! ```

pub mod coordinator;
pub mod transaction;

pub use coordinator::{
    CancelTxArgs, CoordinatorError, CreateTxArgs, IssueTxArgs, MultisigCoordinator, SignTxArgs,
    DEFAULT_EXPIRATION_DAYS,
};
pub use transaction::{MultisigTransaction, OwnerSlot, TxStatus};
