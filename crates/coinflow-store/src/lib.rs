//! `RocksDB` storage layer for coinflow.
//!
//! This crate persists wallets and the webhook credit pipeline using
//! `RocksDB` with column families:
//!
//! - `wallets`: wallet documents keyed by user id. The column family carries
//!   an associative merge operator, so a credit is an atomic increment with
//!   no read-modify-write round trip.
//! - `outbox`: pending credits keyed by processor event id, written durably
//!   before the webhook delivery is acknowledged.
//! - `receipts`: processed-event records keyed by processor event id, which
//!   make credit application idempotent under redelivery.
//!
//! # Example
//!
//! ```no_run
//! use coinflow_core::PendingCredit;
//! use coinflow_store::{RocksStore, Store};
//!
//! let store = RocksStore::open("/tmp/coinflow-db").unwrap();
//!
//! let credit = PendingCredit {
//!     event_id: "evt_1".parse().unwrap(),
//!     user_id: "u1".parse().unwrap(),
//!     amount: 10,
//!     received_at: chrono::Utc::now(),
//! };
//!
//! store.enqueue_credit(&credit).unwrap();
//! let balance = store.apply_credit(&credit).unwrap();
//! assert_eq!(balance, 10);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use coinflow_core::{CreditReceipt, EventId, PendingCredit, UserId, Wallet};

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations behind the service and in tests.
pub trait Store: Send + Sync {
    /// Get a wallet by user ID.
    ///
    /// `None` means the user has never been credited.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_wallet(&self, user_id: &UserId) -> Result<Option<Wallet>>;

    /// Durably queue a credit for later application.
    ///
    /// Returns `false` without writing when a receipt for the event already
    /// exists (the delivery is a duplicate of an applied event). Queueing the
    /// same event id twice overwrites the single outbox entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn enqueue_credit(&self, credit: &PendingCredit) -> Result<bool>;

    /// List queued credits, up to `limit` entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn pending_credits(&self, limit: usize) -> Result<Vec<PendingCredit>>;

    /// Apply a queued credit: merge the wallet delta, write the receipt and
    /// remove the outbox entry in one atomic write batch.
    ///
    /// Returns the wallet balance after the credit.
    ///
    /// # Errors
    ///
    /// - `StoreError::DuplicateEvent` if a receipt for the event already
    ///   exists. The stale outbox entry is removed; the wallet is untouched.
    /// - `StoreError::Database` or `StoreError::Serialization` on failure;
    ///   the outbox entry is left in place for a retry.
    fn apply_credit(&self, credit: &PendingCredit) -> Result<i64>;

    /// Get the receipt for a processed event, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_receipt(&self, event_id: &EventId) -> Result<Option<CreditReceipt>>;
}
