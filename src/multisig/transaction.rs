//! Multisig transaction model
//!
//! A `MultisigTransaction` is the unit of coordination: one unsigned
//! chain transaction plus a signature slot for every owner of the alias
//! it acts on behalf of. State transitions are driven entirely by the
//! coordinator; expiry is evaluated lazily against wall-clock time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One owner's participation record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSlot {
    /// Chain address of the owner, unique within a transaction
    pub address: String,
    /// Recoverable signature hex; empty until this owner signs
    #[serde(default)]
    pub signature: String,
}

impl OwnerSlot {
    /// Create an empty slot for an owner address
    pub fn new(address: String) -> Self {
        Self {
            address,
            signature: String::new(),
        }
    }

    /// Whether this owner has contributed a signature
    pub fn has_signed(&self) -> bool {
        !self.signature.is_empty()
    }
}

/// Lifecycle state of a multisig transaction, derived lazily
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TxStatus {
    /// Created, collecting signatures
    Pending,
    /// Submitted to the chain node (terminal)
    Issued,
    /// Expiration deadline passed (terminal)
    Expired,
}

/// A transaction pending multi-party signature collection
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultisigTransaction {
    /// Hex sha256 of the unsigned transaction bytes; never client-supplied
    pub id: String,
    /// The multisig alias this transaction acts on behalf of
    pub alias: String,
    /// Signature threshold of the alias, snapshotted at creation
    pub threshold: u8,
    /// Chain the transaction targets; scopes the pending invariant
    pub chain_id: String,
    /// Chain transaction id, set exactly once on successful issuance
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Hex-encoded unsigned transaction; the payload of every signature
    pub unsigned_tx: String,
    /// Opaque output owners descriptor, carried through unchanged
    pub output_owners: String,
    /// Opaque metadata, carried through unchanged
    #[serde(default)]
    pub metadata: String,
    /// One slot per alias owner at creation time
    pub owners: Vec<OwnerSlot>,
    /// Expiration deadline
    pub expires_at: Option<DateTime<Utc>>,
    /// Assigned by the store at insertion
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl MultisigTransaction {
    /// Whether the expiration deadline has passed at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now)
    }

    /// Whether the transaction is still open for signing and issuance
    pub fn is_pending(&self, now: DateTime<Utc>) -> bool {
        self.transaction_id.is_none() && !self.is_expired(now)
    }

    /// Derived lifecycle state at `now`
    pub fn status(&self, now: DateTime<Utc>) -> TxStatus {
        if self.transaction_id.is_some() {
            TxStatus::Issued
        } else if self.is_expired(now) {
            TxStatus::Expired
        } else {
            TxStatus::Pending
        }
    }

    /// Look up an owner: `None` if the address is not in the owner set,
    /// otherwise whether that owner has already signed
    pub fn owner_state(&self, address: &str) -> Option<bool> {
        self.owners
            .iter()
            .find(|owner| owner.address == address)
            .map(OwnerSlot::has_signed)
    }

    /// Number of filled signature slots
    pub fn signature_count(&self) -> usize {
        self.owners.iter().filter(|o| o.has_signed()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_tx() -> MultisigTransaction {
        MultisigTransaction {
            id: "ab".repeat(32),
            alias: "test-alias".to_string(),
            threshold: 2,
            chain_id: "chain-p".to_string(),
            transaction_id: None,
            unsigned_tx: "00aa".to_string(),
            output_owners: "owners-blob".to_string(),
            metadata: String::new(),
            owners: vec![
                OwnerSlot {
                    address: "test-addr-a".to_string(),
                    signature: "cafe".to_string(),
                },
                OwnerSlot::new("test-addr-b".to_string()),
            ],
            expires_at: Some(Utc::now() + Duration::days(14)),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_state() {
        let tx = sample_tx();
        assert_eq!(tx.owner_state("test-addr-a"), Some(true));
        assert_eq!(tx.owner_state("test-addr-b"), Some(false));
        assert_eq!(tx.owner_state("test-addr-c"), None);
        assert_eq!(tx.signature_count(), 1);
    }

    #[test]
    fn test_status_pending() {
        let tx = sample_tx();
        let now = Utc::now();
        assert!(tx.is_pending(now));
        assert_eq!(tx.status(now), TxStatus::Pending);
    }

    #[test]
    fn test_status_issued_is_terminal() {
        let mut tx = sample_tx();
        tx.transaction_id = Some("chain-tx-id".to_string());
        let now = Utc::now();
        assert!(!tx.is_pending(now));
        assert_eq!(tx.status(now), TxStatus::Issued);

        // issued wins over expired
        tx.expires_at = Some(now - Duration::hours(1));
        assert_eq!(tx.status(now), TxStatus::Issued);
    }

    #[test]
    fn test_status_expired() {
        let mut tx = sample_tx();
        let now = Utc::now();
        tx.expires_at = Some(now - Duration::seconds(1));
        assert!(!tx.is_pending(now));
        assert_eq!(tx.status(now), TxStatus::Expired);
    }

    #[test]
    fn test_no_deadline_never_expires() {
        let mut tx = sample_tx();
        tx.expires_at = None;
        assert!(tx.is_pending(Utc::now() + Duration::days(10000)));
    }

    #[test]
    fn test_json_field_names() {
        let tx = sample_tx();
        let json = serde_json::to_value(&tx).unwrap();
        assert!(json.get("unsignedTx").is_some());
        assert!(json.get("chainId").is_some());
        assert!(json.get("outputOwners").is_some());
        assert!(json.get("expiresAt").is_some());
        assert!(json.get("timestamp").is_some());
        assert_eq!(json["owners"][0]["address"], "test-addr-a");
    }
}
