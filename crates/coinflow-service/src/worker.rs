//! Outbox drain worker.
//!
//! The webhook handler acknowledges an event once its credit sits durably in
//! the outbox; this worker applies queued credits to wallets. It wakes on a
//! [`Notify`] signal after each enqueue, and a periodic sweep picks up
//! anything left over from a previous run, so delivery is at-least-once and
//! the receipt check makes application idempotent.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

use coinflow_store::{RocksStore, Store, StoreError};

/// Maximum entries read from the outbox per pass.
const DRAIN_BATCH: usize = 64;

/// Spawn the outbox worker.
pub fn spawn(
    store: Arc<RocksStore>,
    notify: Arc<Notify>,
    sweep_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(
            sweep_seconds = sweep_interval.as_secs(),
            "Outbox worker started"
        );

        loop {
            drain(store.as_ref());

            tokio::select! {
                () = notify.notified() => {}
                () = tokio::time::sleep(sweep_interval) => {}
            }
        }
    })
}

/// Apply every credit currently queued in the outbox.
///
/// An entry that fails to apply stays queued for the next pass; a duplicate
/// (receipt already written) is cleared and skipped.
pub fn drain(store: &dyn Store) {
    loop {
        let pending = match store.pending_credits(DRAIN_BATCH) {
            Ok(pending) => pending,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read outbox");
                return;
            }
        };

        if pending.is_empty() {
            return;
        }

        let mut progressed = false;
        for credit in &pending {
            match store.apply_credit(credit) {
                Ok(balance) => {
                    progressed = true;
                    tracing::info!(
                        event_id = %credit.event_id,
                        user_id = %credit.user_id,
                        amount = %credit.amount,
                        balance = %balance,
                        "Wallet credit applied"
                    );
                }
                Err(StoreError::DuplicateEvent { .. }) => {
                    progressed = true;
                    tracing::debug!(
                        event_id = %credit.event_id,
                        "Skipping already-applied credit"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        event_id = %credit.event_id,
                        error = %e,
                        "Failed to apply credit, leaving it queued"
                    );
                }
            }
        }

        // Nothing in this batch went through; stop instead of spinning on
        // the same failing entries. The sweep retries later.
        if !progressed {
            return;
        }
    }
}
