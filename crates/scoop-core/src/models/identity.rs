use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DriveError;

/// Base58 public key, 32 to 44 characters.
static BASE58_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").expect("static pattern compiles")
});

const SHORT_PREFIX: usize = 4;
const SHORT_SUFFIX: usize = 4;

/// Opaque wallet public address.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap an address without validating it.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Parse a base58 public key.
    pub fn parse(address: &str) -> Result<Self, DriveError> {
        let address = address.trim();
        if BASE58_KEY.is_match(address) {
            Ok(Self(address.to_string()))
        } else {
            Err(DriveError::InvalidRequest(format!(
                "'{}' is not a valid address",
                address
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for display (AbCd...WxYz).
    pub fn short(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= SHORT_PREFIX + SHORT_SUFFIX + 3 {
            return self.0.clone();
        }
        let prefix: String = chars[..SHORT_PREFIX].iter().collect();
        let suffix: String = chars[chars.len() - SHORT_SUFFIX..].iter().collect();
        format!("{}...{}", prefix, suffix)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wallet session as reported by the identity adapter.
///
/// Read-only to the core: the adapter creates a new value on every change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Identity {
    pub address: Option<Address>,
    pub connected: bool,
}

impl Identity {
    /// No wallet.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// A connected wallet.
    pub fn connected(address: Address) -> Self {
        Self {
            address: Some(address),
            connected: true,
        }
    }

    /// The address usable for authorization, if the session is live.
    pub fn active(&self) -> Option<&Address> {
        if self.connected {
            self.address.as_ref()
        } else {
            None
        }
    }

    pub fn is_connected(&self) -> bool {
        self.active().is_some()
    }
}
