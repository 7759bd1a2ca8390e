//! Outbox entries and receipts for the webhook credit pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EventId, UserId};

/// A verified but not yet applied wallet credit.
///
/// Written durably before the webhook delivery is acknowledged, keyed by the
/// processor event id so redeliveries collapse into a single entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCredit {
    /// The processor event that authorized this credit.
    pub event_id: EventId,

    /// The wallet to credit.
    pub user_id: UserId,

    /// Credit amount, in whole coins.
    pub amount: i64,

    /// When the webhook delivery was received.
    pub received_at: DateTime<Utc>,
}

/// A record that a credit has been applied to a wallet.
///
/// The presence of a receipt for an event id means that event must never be
/// applied again, whatever the outbox or the processor redeliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditReceipt {
    /// The processor event the credit came from.
    pub event_id: EventId,

    /// The wallet that was credited.
    pub user_id: UserId,

    /// Credit amount, in whole coins.
    pub amount: i64,

    /// When the credit was applied.
    pub processed_at: DateTime<Utc>,
}

impl CreditReceipt {
    /// Build the receipt for an applied pending credit.
    #[must_use]
    pub fn for_credit(credit: &PendingCredit, processed_at: DateTime<Utc>) -> Self {
        Self {
            event_id: credit.event_id.clone(),
            user_id: credit.user_id.clone(),
            amount: credit.amount,
            processed_at,
        }
    }
}
