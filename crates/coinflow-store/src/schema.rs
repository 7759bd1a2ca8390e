//! Database schema definitions and column families.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Wallet documents, keyed by user id. Uses the credit merge operator.
    pub const WALLETS: &str = "wallets";

    /// Pending credits, keyed by processor event id.
    pub const OUTBOX: &str = "outbox";

    /// Processed-event receipts, keyed by processor event id.
    pub const RECEIPTS: &str = "receipts";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::WALLETS, cf::OUTBOX, cf::RECEIPTS]
}
