//! Key encoding for `RocksDB` column families.
//!
//! Wallets are keyed by the raw user-id bytes; outbox entries and receipts
//! share the raw event-id bytes, so an event moves from `outbox` to
//! `receipts` under the same key.

use coinflow_core::{EventId, UserId};

/// Create a wallet key from a user ID.
#[must_use]
pub fn wallet_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create an outbox key from a processor event ID.
#[must_use]
pub fn outbox_key(event_id: &EventId) -> Vec<u8> {
    event_id.as_bytes().to_vec()
}

/// Create a receipt key from a processor event ID.
#[must_use]
pub fn receipt_key(event_id: &EventId) -> Vec<u8> {
    event_id.as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_key_is_user_id_bytes() {
        let user_id: UserId = "u1".parse().unwrap();
        assert_eq!(wallet_key(&user_id), b"u1".to_vec());
    }

    #[test]
    fn outbox_and_receipt_keys_match() {
        let event_id: EventId = "evt_1PqRsT".parse().unwrap();
        assert_eq!(outbox_key(&event_id), receipt_key(&event_id));
        assert_eq!(outbox_key(&event_id), b"evt_1PqRsT".to_vec());
    }
}
