//! `RocksDB` storage implementation.
//!
//! This module provides the [`RocksStore`] implementation of the [`Store`]
//! trait. Wallet credits go through a merge operator rather than a get/put
//! cycle: concurrent credits to the same user commute, which is the
//! guarantee the rest of the system leans on.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MergeOperands,
    MultiThreaded, Options, WriteBatch,
};

use coinflow_core::{CreditReceipt, EventId, PendingCredit, UserId, Wallet};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| {
                let mut cf_opts = Options::default();
                if name == cf::WALLETS {
                    cf_opts.set_merge_operator_associative("wallet_credit", wallet_merge);
                }
                ColumnFamilyDescriptor::new(name, cf_opts)
            })
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

/// Merge operator for the `wallets` column family.
///
/// The stored value and every operand are CBOR wallet documents; a credit is
/// written as a delta document whose balance is the increment. Merging sums
/// balances and keeps the latest timestamp, so the operator is associative
/// and order-insensitive.
fn wallet_merge(
    _key: &[u8],
    existing: Option<&[u8]>,
    operands: &MergeOperands,
) -> Option<Vec<u8>> {
    let mut wallet = match existing {
        Some(data) => decode_wallet(data)?,
        None => Wallet::empty(),
    };

    for operand in operands.iter() {
        let delta = decode_wallet(operand)?;
        wallet = wallet.merged(&delta);
    }

    encode_wallet(&wallet)
}

fn decode_wallet(data: &[u8]) -> Option<Wallet> {
    match ciborium::from_reader(data) {
        Ok(wallet) => Some(wallet),
        Err(e) => {
            // Returning None fails the merge; the write surfaces as an error
            // instead of silently dropping the operand.
            tracing::error!(error = %e, "Undecodable wallet document in merge");
            None
        }
    }
}

fn encode_wallet(wallet: &Wallet) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    match ciborium::into_writer(wallet, &mut buf) {
        Ok(()) => Some(buf),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode wallet document in merge");
            None
        }
    }
}

impl Store for RocksStore {
    fn get_wallet(&self, user_id: &UserId) -> Result<Option<Wallet>> {
        let cf = self.cf(cf::WALLETS)?;
        let key = keys::wallet_key(user_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn enqueue_credit(&self, credit: &PendingCredit) -> Result<bool> {
        if self.get_receipt(&credit.event_id)?.is_some() {
            return Ok(false);
        }

        let cf = self.cf(cf::OUTBOX)?;
        let key = keys::outbox_key(&credit.event_id);
        let value = Self::serialize(credit)?;

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(true)
    }

    fn pending_credits(&self, limit: usize) -> Result<Vec<PendingCredit>> {
        let cf = self.cf(cf::OUTBOX)?;

        let mut credits = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            if credits.len() >= limit {
                break;
            }
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            credits.push(Self::deserialize(&value)?);
        }

        Ok(credits)
    }

    fn apply_credit(&self, credit: &PendingCredit) -> Result<i64> {
        let cf_outbox = self.cf(cf::OUTBOX)?;

        if self.get_receipt(&credit.event_id)?.is_some() {
            // The credit already landed; only the stale outbox entry is left
            // to clean up.
            self.db
                .delete_cf(&cf_outbox, keys::outbox_key(&credit.event_id))
                .map_err(|e| StoreError::Database(e.to_string()))?;
            return Err(StoreError::DuplicateEvent {
                event_id: credit.event_id.to_string(),
            });
        }

        let cf_wallets = self.cf(cf::WALLETS)?;
        let cf_receipts = self.cf(cf::RECEIPTS)?;

        let now = Utc::now();
        let delta = Wallet::credit_delta(credit.amount, now);
        let receipt = CreditReceipt::for_credit(credit, now);

        let mut batch = WriteBatch::default();
        batch.merge_cf(
            &cf_wallets,
            keys::wallet_key(&credit.user_id),
            Self::serialize(&delta)?,
        );
        batch.put_cf(
            &cf_receipts,
            keys::receipt_key(&credit.event_id),
            Self::serialize(&receipt)?,
        );
        batch.delete_cf(&cf_outbox, keys::outbox_key(&credit.event_id));

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let balance = self
            .get_wallet(&credit.user_id)?
            .map_or(credit.amount, |w| w.balance);

        Ok(balance)
    }

    fn get_receipt(&self, event_id: &EventId) -> Result<Option<CreditReceipt>> {
        let cf = self.cf(cf::RECEIPTS)?;
        let key = keys::receipt_key(event_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }
}
