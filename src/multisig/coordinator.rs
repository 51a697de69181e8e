//! Multisig transaction coordination
//!
//! Orchestrates the create / sign / issue / cancel lifecycle. Every
//! request is authenticated by recovering the caller's address from a
//! recoverable signature over a request-specific payload, and
//! authorized against the owner set of the targeted alias.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::chain::SignedTransaction;
use crate::crypto::{recover_address, sha256_hex, strip_hex_prefix};
use crate::multisig::{MultisigTransaction, OwnerSlot};
use crate::node::{AliasResolver, NodeError, NodeGateway};
use crate::storage::{StoreError, TransactionStore};

/// Default lifetime of a pending transaction
pub const DEFAULT_EXPIRATION_DAYS: i64 = 14;

/// Errors surfaced by coordination operations
#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("multisig transaction does not exist")]
    TxNotExists,
    #[error("signature is empty")]
    EmptySignature,
    #[error("failed to retrieve address from signature")]
    ParsingSignature,
    #[error("address is not an owner for this alias")]
    AddressNotOwner,
    #[error("owner has already signed this transaction")]
    OwnerHasSigned,
    #[error("threshold is not a number")]
    ThresholdParsing,
    #[error("error parsing signed tx")]
    ParsingTx,
    #[error("there is already a pending tx for this alias")]
    PendingTx,
    #[error("expiration date has passed")]
    Expired,
    #[error(transparent)]
    Node(#[from] NodeError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoordinatorError {
    /// Stable machine-readable kind for API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            CoordinatorError::TxNotExists => "tx_not_exists",
            CoordinatorError::EmptySignature => "empty_signature",
            CoordinatorError::ParsingSignature => "parsing_signature",
            CoordinatorError::AddressNotOwner => "address_not_owner",
            CoordinatorError::OwnerHasSigned => "owner_has_signed",
            CoordinatorError::ThresholdParsing => "threshold_parsing",
            CoordinatorError::ParsingTx => "parsing_tx",
            CoordinatorError::PendingTx => "pending_tx",
            CoordinatorError::Expired => "expired",
            CoordinatorError::Node(NodeError::AliasNotFound) => "alias_not_found",
            CoordinatorError::Node(_) => "gateway_failure",
            CoordinatorError::Store(_) => "storage_failure",
        }
    }
}

/// Arguments for creating a multisig transaction
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTxArgs {
    pub alias: String,
    pub unsigned_tx: String,
    pub signature: String,
    pub output_owners: String,
    #[serde(default)]
    pub metadata: String,
    /// Absolute Unix timestamp; 0 means the default expiration window
    #[serde(default)]
    pub expiration: i64,
    pub chain_id: String,
}

/// Arguments for signing an existing transaction
#[derive(Clone, Debug, Deserialize)]
pub struct SignTxArgs {
    pub signature: String,
}

/// Arguments for issuing a fully-signed transaction
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTxArgs {
    pub signed_tx: String,
    pub signature: String,
}

/// Arguments for cancelling a pending transaction
#[derive(Clone, Debug, Deserialize)]
pub struct CancelTxArgs {
    pub id: String,
    pub timestamp: String,
    pub signature: String,
}

/// Coordinates multi-party signature collection for alias transactions
///
/// Constructed with its collaborators injected; holds no global state.
pub struct MultisigCoordinator {
    network_id: u32,
    expiration_days: i64,
    store: Arc<dyn TransactionStore>,
    alias_resolver: Arc<dyn AliasResolver>,
    gateway: Arc<dyn NodeGateway>,
}

impl MultisigCoordinator {
    /// Create a coordinator
    ///
    /// `expiration_days <= 0` selects the default expiration window.
    pub fn new(
        network_id: u32,
        expiration_days: i64,
        store: Arc<dyn TransactionStore>,
        alias_resolver: Arc<dyn AliasResolver>,
        gateway: Arc<dyn NodeGateway>,
    ) -> Self {
        Self {
            network_id,
            expiration_days,
            store,
            alias_resolver,
            gateway,
        }
    }

    /// Create a new multisig transaction for an alias
    ///
    /// The creator authenticates with a signature over the unsigned
    /// transaction bytes and must be an owner of the alias. At most one
    /// pending transaction may exist per `(alias, chain_id)`.
    pub async fn create_transaction(
        &self,
        args: &CreateTxArgs,
    ) -> Result<MultisigTransaction, CoordinatorError> {
        if self
            .store
            .pending_alias_exists(&args.alias, &args.chain_id)?
        {
            return Err(CoordinatorError::PendingTx);
        }

        let alias_info = self.alias_resolver.get_alias_info(&args.alias).await?;
        let threshold: u8 = alias_info
            .threshold
            .parse()
            .map_err(|_| CoordinatorError::ThresholdParsing)?;

        let now = Utc::now();
        let expires_at = self.expiration_deadline(args.expiration, now)?;
        if expires_at <= now {
            return Err(CoordinatorError::Expired);
        }

        let unsigned_bytes = hex::decode(strip_hex_prefix(&args.unsigned_tx))
            .map_err(|_| CoordinatorError::ParsingSignature)?;
        let creator = recover_address(&unsigned_bytes, &args.signature, self.network_id)
            .map_err(|_| CoordinatorError::ParsingSignature)?;

        if !alias_info.addresses.iter().any(|addr| *addr == creator) {
            return Err(CoordinatorError::AddressNotOwner);
        }

        let id = sha256_hex(&unsigned_bytes);
        let owners = alias_info
            .addresses
            .iter()
            .map(|address| {
                if *address == creator {
                    OwnerSlot {
                        address: address.clone(),
                        signature: args.signature.clone(),
                    }
                } else {
                    OwnerSlot::new(address.clone())
                }
            })
            .collect();

        let tx = MultisigTransaction {
            id: id.clone(),
            alias: args.alias.clone(),
            threshold,
            chain_id: args.chain_id.clone(),
            transaction_id: None,
            unsigned_tx: strip_hex_prefix(&args.unsigned_tx).to_string(),
            output_owners: args.output_owners.clone(),
            metadata: args.metadata.clone(),
            owners,
            expires_at: Some(expires_at),
            created_at: now,
        };

        match self.store.create(tx) {
            Ok(_) => {}
            Err(StoreError::PendingExists) => return Err(CoordinatorError::PendingTx),
            Err(err) => return Err(err.into()),
        }

        self.get_transaction(&id)
    }

    /// Fetch all pending transactions of an alias visible to the caller
    ///
    /// The caller authenticates with a signature over `alias || timestamp`
    /// and sees only aliases they are an owner of.
    pub fn get_all_for_alias(
        &self,
        alias: &str,
        timestamp: &str,
        signature: &str,
    ) -> Result<Vec<MultisigTransaction>, CoordinatorError> {
        let payload = format!("{}{}", alias, timestamp);
        let owner = recover_address(payload.as_bytes(), signature, self.network_id)
            .map_err(|_| CoordinatorError::ParsingSignature)?;

        Ok(self.store.get_for_alias(alias, &owner)?)
    }

    /// Fetch a single pending transaction by id
    pub fn get_transaction(&self, id: &str) -> Result<MultisigTransaction, CoordinatorError> {
        self.store
            .get_by_id(id)?
            .ok_or(CoordinatorError::TxNotExists)
    }

    /// Add an owner's signature to a pending transaction
    ///
    /// The signer authenticates with a signature over the transaction's
    /// unsigned bytes. Each owner slot can be filled exactly once.
    pub fn sign_transaction(
        &self,
        id: &str,
        args: &SignTxArgs,
    ) -> Result<MultisigTransaction, CoordinatorError> {
        let tx = self.get_transaction(id)?;

        if args.signature.is_empty() {
            return Err(CoordinatorError::EmptySignature);
        }

        let unsigned_bytes = hex::decode(strip_hex_prefix(&tx.unsigned_tx))
            .map_err(|_| CoordinatorError::ParsingSignature)?;
        let signer = recover_address(&unsigned_bytes, &args.signature, self.network_id)
            .map_err(|_| CoordinatorError::ParsingSignature)?;

        match tx.owner_state(&signer) {
            None => return Err(CoordinatorError::AddressNotOwner),
            Some(true) => return Err(CoordinatorError::OwnerHasSigned),
            Some(false) => {}
        }

        if !self.store.add_signature(id, &signer, &args.signature)? {
            // Lost a race: either the slot was filled concurrently or the
            // transaction left the pending state.
            return match self.store.get_by_id(id)? {
                Some(_) => Err(CoordinatorError::OwnerHasSigned),
                None => Err(CoordinatorError::TxNotExists),
            };
        }

        self.get_transaction(id)
    }

    /// Submit a fully-signed transaction to the chain node
    ///
    /// The signed payload is bound back to the stored transaction through
    /// the hash of its unsigned portion; the submitter must be an owner.
    /// Threshold satisfaction is left to the chain node.
    pub async fn issue_transaction(
        &self,
        args: &IssueTxArgs,
    ) -> Result<String, CoordinatorError> {
        let signed_bytes = hex::decode(strip_hex_prefix(&args.signed_tx))
            .map_err(|_| CoordinatorError::ParsingTx)?;
        let signed = SignedTransaction::decode(&signed_bytes)
            .map_err(|_| CoordinatorError::ParsingTx)?;

        let id = sha256_hex(&signed.unsigned_bytes);
        let stored = self.get_transaction(&id)?;

        let submitter = recover_address(&signed_bytes, &args.signature, self.network_id)
            .map_err(|_| CoordinatorError::ParsingSignature)?;
        if stored.owner_state(&submitter).is_none() {
            return Err(CoordinatorError::AddressNotOwner);
        }

        let chain_tx_id = self.gateway.issue_tx(&signed_bytes).await?;

        if !self.store.set_chain_tx_id(&id, &chain_tx_id)? {
            log::warn!(
                "transaction {} was already issued; keeping the stored chain tx id",
                id
            );
        }
        Ok(chain_tx_id)
    }

    /// Cancel a pending transaction
    ///
    /// The caller authenticates with a signature over the request
    /// timestamp and must be an owner of the transaction's alias.
    pub fn cancel_transaction(&self, args: &CancelTxArgs) -> Result<(), CoordinatorError> {
        let owner = recover_address(args.timestamp.as_bytes(), &args.signature, self.network_id)
            .map_err(|_| CoordinatorError::ParsingSignature)?;

        let tx = self.get_transaction(&args.id)?;
        if tx.owner_state(&owner).is_none() {
            return Err(CoordinatorError::AddressNotOwner);
        }

        if !self.store.delete(&args.id)? {
            return Err(CoordinatorError::TxNotExists);
        }
        Ok(())
    }

    fn expiration_deadline(
        &self,
        requested: i64,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, CoordinatorError> {
        if requested == 0 {
            let days = if self.expiration_days <= 0 {
                DEFAULT_EXPIRATION_DAYS
            } else {
                self.expiration_days
            };
            return Ok(now + Duration::days(days));
        }
        Utc.timestamp_opt(requested, 0)
            .single()
            .ok_or(CoordinatorError::Expired)
    }
}
