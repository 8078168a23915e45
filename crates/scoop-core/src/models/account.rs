use std::fmt;

use serde::{Deserialize, Serialize};

use super::Address;

/// Opaque storage account key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A storage account ("drive") with its metadata.
///
/// `used_bytes <= quota_bytes` is advisory only; the network is authoritative
/// and may report usage above the reservation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageAccount {
    pub id: AccountId,
    pub display_name: String,
    pub owner: Address,
    pub quota_bytes: u64,
    pub used_bytes: u64,
    pub immutable: bool,
}

impl StorageAccount {
    /// A freshly created, empty, mutable account.
    pub fn created(
        id: AccountId,
        display_name: impl Into<String>,
        owner: Address,
        quota_bytes: u64,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            owner,
            quota_bytes,
            used_bytes: 0,
            immutable: false,
        }
    }

    pub fn is_owned_by(&self, address: &Address) -> bool {
        &self.owner == address
    }

    /// Fraction of the quota in use, clamped to `0.0..=1.0`.
    pub fn usage_ratio(&self) -> f64 {
        if self.quota_bytes == 0 {
            return 0.0;
        }
        (self.used_bytes as f64 / self.quota_bytes as f64).clamp(0.0, 1.0)
    }

    /// Usage as a percentage with two decimals, for display.
    pub fn usage_percent(&self) -> String {
        format!("{:.2} %", self.usage_ratio() * 100.0)
    }

    pub fn remaining_bytes(&self) -> u64 {
        self.quota_bytes.saturating_sub(self.used_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(quota: u64, used: u64) -> StorageAccount {
        let owner = Address::new("owner");
        StorageAccount {
            used_bytes: used,
            ..StorageAccount::created(AccountId::new("acct"), "Docs", owner, quota)
        }
    }

    #[test]
    fn test_created_account() {
        let acct = StorageAccount::created(AccountId::new("a"), "Docs", Address::new("o"), 1024);
        assert_eq!(acct.used_bytes, 0);
        assert!(!acct.immutable);
        assert!(acct.is_owned_by(&Address::new("o")));
        assert!(!acct.is_owned_by(&Address::new("p")));
    }

    #[test]
    fn test_usage() {
        assert_eq!(account(1000, 250).usage_ratio(), 0.25);
        assert_eq!(account(1000, 250).usage_percent(), "25.00 %");
        assert_eq!(account(0, 10).usage_ratio(), 0.0);
        // Server may report usage above the reservation
        assert_eq!(account(100, 150).usage_ratio(), 1.0);
        assert_eq!(account(100, 150).remaining_bytes(), 0);
        assert_eq!(account(100, 30).remaining_bytes(), 70);
    }
}
