//! Wallet records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's coin wallet.
///
/// One record exists per user, created implicitly on first credit. The
/// balance only ever moves by relative increments applied in the store;
/// no code path writes an absolute balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Coin balance, in whole coins.
    pub balance: i64,

    /// When the wallet was last credited (store clock).
    pub last_updated: DateTime<Utc>,
}

impl Wallet {
    /// An empty wallet, the implicit starting point for the first credit.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            balance: 0,
            last_updated: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// A wallet-shaped delta document representing a single credit.
    ///
    /// Folding deltas together sums balances and keeps the latest timestamp,
    /// so credits commute regardless of application order.
    #[must_use]
    pub fn credit_delta(amount: i64, at: DateTime<Utc>) -> Self {
        Self {
            balance: amount,
            last_updated: at,
        }
    }

    /// Fold another wallet document (or delta) into this one.
    #[must_use]
    pub fn merged(self, other: &Self) -> Self {
        Self {
            balance: self.balance + other.balance,
            last_updated: self.last_updated.max(other.last_updated),
        }
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn empty_wallet_has_zero_balance() {
        let wallet = Wallet::empty();
        assert_eq!(wallet.balance, 0);
        assert_eq!(wallet.last_updated, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn merging_deltas_sums_balances() {
        let t1 = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 5).unwrap();

        let wallet = Wallet::empty()
            .merged(&Wallet::credit_delta(10, t1))
            .merged(&Wallet::credit_delta(25, t2));

        assert_eq!(wallet.balance, 35);
        assert_eq!(wallet.last_updated, t2);
    }

    #[test]
    fn merge_order_does_not_matter() {
        let t1 = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 5).unwrap();
        let a = Wallet::credit_delta(10, t2);
        let b = Wallet::credit_delta(25, t1);

        let forward = Wallet::empty().merged(&a).merged(&b);
        let reverse = Wallet::empty().merged(&b).merged(&a);

        assert_eq!(forward, reverse);
        assert_eq!(forward.last_updated, t2);
    }
}
