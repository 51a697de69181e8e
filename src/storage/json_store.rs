//! JSON-file-backed transaction store
//!
//! Keeps the full transaction set in memory behind a mutex and writes
//! it through to disk on every mutation, using a temporary file and an
//! atomic rename. All conditional checks run inside the lock, which
//! closes the create/create race on the pending-alias invariant.

use std::collections::HashMap;
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::multisig::MultisigTransaction;
use crate::storage::store::{StoreError, TransactionStore};

/// Store configuration
#[derive(Debug, Clone)]
pub struct JsonStoreConfig {
    pub data_dir: PathBuf,
    pub transactions_file: String,
}

impl Default for JsonStoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".sigvault_data"),
            transactions_file: "transactions.json".to_string(),
        }
    }
}

/// File-backed transaction store
pub struct JsonStore {
    config: JsonStoreConfig,
    inner: Mutex<HashMap<String, MultisigTransaction>>,
}

impl JsonStore {
    /// Open a store, loading any previously persisted transactions
    pub fn new(config: JsonStoreConfig) -> Result<Self, StoreError> {
        fs::create_dir_all(&config.data_dir)?;

        let path = config.data_dir.join(&config.transactions_file);
        let transactions = if path.exists() {
            let file = fs::File::open(&path)?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader)?
        } else {
            HashMap::new()
        };

        Ok(Self {
            config,
            inner: Mutex::new(transactions),
        })
    }

    /// Open with default configuration
    pub fn with_defaults() -> Result<Self, StoreError> {
        Self::new(JsonStoreConfig::default())
    }

    fn transactions_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.transactions_file)
    }

    fn guard(&self) -> MutexGuard<'_, HashMap<String, MultisigTransaction>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Write the full map to a temporary file, then rename into place
    fn persist(&self, transactions: &HashMap<String, MultisigTransaction>) -> Result<(), StoreError> {
        let temp_path = self.config.data_dir.join("transactions.tmp");
        let file = fs::File::create(&temp_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, transactions)?;
        fs::rename(&temp_path, self.transactions_path())?;
        Ok(())
    }
}

impl TransactionStore for JsonStore {
    fn pending_alias_exists(&self, alias: &str, chain_id: &str) -> Result<bool, StoreError> {
        let now = Utc::now();
        let transactions = self.guard();
        Ok(transactions
            .values()
            .any(|tx| tx.alias == alias && tx.chain_id == chain_id && tx.is_pending(now)))
    }

    fn create(&self, mut tx: MultisigTransaction) -> Result<String, StoreError> {
        let now = Utc::now();
        let mut transactions = self.guard();

        // Expired, never-issued rows are dead weight; dropping them here
        // lets an identical payload be resubmitted after expiry.
        transactions.retain(|_, existing| {
            existing.transaction_id.is_some() || !existing.is_expired(now)
        });

        if transactions.contains_key(&tx.id) {
            return Err(StoreError::DuplicateId);
        }
        if transactions
            .values()
            .any(|existing| {
                existing.alias == tx.alias
                    && existing.chain_id == tx.chain_id
                    && existing.is_pending(now)
            })
        {
            return Err(StoreError::PendingExists);
        }

        tx.created_at = now;
        let id = tx.id.clone();
        transactions.insert(id.clone(), tx);

        if let Err(err) = self.persist(&transactions) {
            transactions.remove(&id);
            return Err(err);
        }
        Ok(id)
    }

    fn get_by_id(&self, id: &str) -> Result<Option<MultisigTransaction>, StoreError> {
        let now = Utc::now();
        let transactions = self.guard();
        Ok(transactions
            .get(id)
            .filter(|tx| tx.is_pending(now))
            .cloned())
    }

    fn get_for_alias(
        &self,
        alias: &str,
        owner: &str,
    ) -> Result<Vec<MultisigTransaction>, StoreError> {
        let now = Utc::now();
        let transactions = self.guard();
        let mut result: Vec<MultisigTransaction> = transactions
            .values()
            .filter(|tx| {
                tx.alias == alias
                    && tx.is_pending(now)
                    && tx.owners.iter().any(|slot| slot.address == owner)
            })
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }

    fn add_signature(
        &self,
        id: &str,
        address: &str,
        signature: &str,
    ) -> Result<bool, StoreError> {
        let now = Utc::now();
        let mut transactions = self.guard();

        let Some(tx) = transactions.get_mut(id).filter(|tx| tx.is_pending(now)) else {
            return Ok(false);
        };
        let Some(slot) = tx
            .owners
            .iter_mut()
            .find(|slot| slot.address == address && !slot.has_signed())
        else {
            return Ok(false);
        };

        slot.signature = signature.to_string();
        if let Err(err) = self.persist(&transactions) {
            if let Some(tx) = transactions.get_mut(id) {
                if let Some(slot) = tx.owners.iter_mut().find(|slot| slot.address == address) {
                    slot.signature.clear();
                }
            }
            return Err(err);
        }
        Ok(true)
    }

    fn set_chain_tx_id(&self, id: &str, chain_tx_id: &str) -> Result<bool, StoreError> {
        let mut transactions = self.guard();

        let Some(tx) = transactions
            .get_mut(id)
            .filter(|tx| tx.transaction_id.is_none())
        else {
            return Ok(false);
        };

        tx.transaction_id = Some(chain_tx_id.to_string());
        if let Err(err) = self.persist(&transactions) {
            if let Some(tx) = transactions.get_mut(id) {
                tx.transaction_id = None;
            }
            return Err(err);
        }
        Ok(true)
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut transactions = self.guard();

        let Some(removed) = transactions.remove(id) else {
            return Ok(false);
        };
        if let Err(err) = self.persist(&transactions) {
            transactions.insert(id.to_string(), removed);
            return Err(err);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multisig::OwnerSlot;
    use chrono::Duration;

    fn temp_store() -> (tempfile::TempDir, JsonStore) {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = JsonStoreConfig {
            data_dir: temp_dir.path().to_path_buf(),
            ..Default::default()
        };
        let store = JsonStore::new(config).unwrap();
        (temp_dir, store)
    }

    fn sample_tx(id: &str, alias: &str) -> MultisigTransaction {
        MultisigTransaction {
            id: id.to_string(),
            alias: alias.to_string(),
            threshold: 2,
            chain_id: "chain-p".to_string(),
            transaction_id: None,
            unsigned_tx: "00aa".to_string(),
            output_owners: "owners-blob".to_string(),
            metadata: String::new(),
            owners: vec![
                OwnerSlot {
                    address: "addr-a".to_string(),
                    signature: "sig-a".to_string(),
                },
                OwnerSlot::new("addr-b".to_string()),
            ],
            expires_at: Some(Utc::now() + Duration::days(14)),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_and_get() {
        let (_dir, store) = temp_store();
        let id = store.create(sample_tx("tx-1", "alias-1")).unwrap();
        assert_eq!(id, "tx-1");

        let tx = store.get_by_id("tx-1").unwrap().unwrap();
        assert_eq!(tx.alias, "alias-1");
        assert!(store.pending_alias_exists("alias-1", "chain-p").unwrap());
        assert!(!store.pending_alias_exists("alias-1", "chain-x").unwrap());
    }

    #[test]
    fn test_second_pending_for_alias_rejected() {
        let (_dir, store) = temp_store();
        store.create(sample_tx("tx-1", "alias-1")).unwrap();

        let result = store.create(sample_tx("tx-2", "alias-1"));
        assert!(matches!(result, Err(StoreError::PendingExists)));

        // a different alias is unaffected
        store.create(sample_tx("tx-3", "alias-2")).unwrap();
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let (_dir, store) = temp_store();
        store.create(sample_tx("tx-1", "alias-1")).unwrap();
        let result = store.create(sample_tx("tx-1", "alias-2"));
        assert!(matches!(result, Err(StoreError::DuplicateId)));
    }

    #[test]
    fn test_add_signature_is_append_once() {
        let (_dir, store) = temp_store();
        store.create(sample_tx("tx-1", "alias-1")).unwrap();

        assert!(store.add_signature("tx-1", "addr-b", "sig-b").unwrap());
        // second write to the same slot is refused
        assert!(!store.add_signature("tx-1", "addr-b", "sig-b2").unwrap());
        // unknown owner and unknown tx are refused
        assert!(!store.add_signature("tx-1", "addr-x", "sig-x").unwrap());
        assert!(!store.add_signature("tx-9", "addr-b", "sig-b").unwrap());

        let tx = store.get_by_id("tx-1").unwrap().unwrap();
        assert_eq!(tx.owners[1].signature, "sig-b");
        assert_eq!(tx.signature_count(), 2);
    }

    #[test]
    fn test_set_chain_tx_id_once() {
        let (_dir, store) = temp_store();
        store.create(sample_tx("tx-1", "alias-1")).unwrap();

        assert!(store.set_chain_tx_id("tx-1", "chain-tx-1").unwrap());
        assert!(!store.set_chain_tx_id("tx-1", "chain-tx-2").unwrap());

        // issued transactions are invisible to pending reads
        assert!(store.get_by_id("tx-1").unwrap().is_none());
        assert!(!store.pending_alias_exists("alias-1", "chain-p").unwrap());
    }

    #[test]
    fn test_get_for_alias_filters_by_owner() {
        let (_dir, store) = temp_store();
        store.create(sample_tx("tx-1", "alias-1")).unwrap();

        let txs = store.get_for_alias("alias-1", "addr-a").unwrap();
        assert_eq!(txs.len(), 1);
        assert!(store.get_for_alias("alias-1", "addr-x").unwrap().is_empty());
        assert!(store.get_for_alias("alias-9", "addr-a").unwrap().is_empty());
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = temp_store();
        store.create(sample_tx("tx-1", "alias-1")).unwrap();

        assert!(store.delete("tx-1").unwrap());
        assert!(!store.delete("tx-1").unwrap());
        assert!(store.get_by_id("tx-1").unwrap().is_none());

        // the alias is free again after deletion
        store.create(sample_tx("tx-2", "alias-1")).unwrap();
    }

    #[test]
    fn test_expired_tx_is_invisible_and_purged() {
        let (_dir, store) = temp_store();
        let mut tx = sample_tx("tx-1", "alias-1");
        tx.expires_at = Some(Utc::now() - Duration::hours(1));
        store.create(tx).unwrap();

        assert!(store.get_by_id("tx-1").unwrap().is_none());
        assert!(!store.pending_alias_exists("alias-1", "chain-p").unwrap());
        assert!(!store.add_signature("tx-1", "addr-b", "sig-b").unwrap());

        // an identical payload can be resubmitted once the old row expired
        store.create(sample_tx("tx-1", "alias-1")).unwrap();
    }

    #[test]
    fn test_reload_from_disk() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = JsonStoreConfig {
            data_dir: temp_dir.path().to_path_buf(),
            ..Default::default()
        };

        let store = JsonStore::new(config.clone()).unwrap();
        store.create(sample_tx("tx-1", "alias-1")).unwrap();
        store.add_signature("tx-1", "addr-b", "sig-b").unwrap();
        drop(store);

        let reopened = JsonStore::new(config).unwrap();
        let tx = reopened.get_by_id("tx-1").unwrap().unwrap();
        assert_eq!(tx.signature_count(), 2);
    }
}
