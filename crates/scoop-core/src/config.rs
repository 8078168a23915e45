//! Orchestrator configuration.
//!
//! Centralizes the constants the core relies on. [`DriveConfig`] bundles the
//! ones a host page may want to override.

use std::time::Duration;

use serde::Deserialize;

// =============================================================================
// Network Configuration
// =============================================================================

/// Default RPC endpoint the storage SDK is bound to.
pub const DEFAULT_RPC_ENDPOINT: &str = "https://api.mainnet-beta.solana.com";

/// Public gateway serving stored objects at `<gateway>/<account>/<name>`.
pub const DEFAULT_GATEWAY: &str = "https://shdw-drive.genesysgo.net";

// =============================================================================
// Notification Configuration
// =============================================================================

/// How long `success` and `error` notices stay visible, in seconds.
pub const NOTICE_TTL_SECS: u64 = 5;

// =============================================================================
// Mutation Configuration
// =============================================================================

/// Maximum number of settled tasks kept in the coordinator's log.
pub const MAX_TASK_HISTORY: usize = 50;

/// Runtime configuration for a [`DriveSession`](crate::DriveSession).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// RPC endpoint handed to the SDK connector.
    pub endpoint: String,
    /// Object gateway used for URLs and size probes.
    pub gateway: String,
    /// Auto-dismiss interval for settled notices.
    #[serde(with = "secs")]
    pub notice_ttl: Duration,
    /// Settled-task history bound.
    pub task_history: usize,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_RPC_ENDPOINT.to_string(),
            gateway: DEFAULT_GATEWAY.to_string(),
            notice_ttl: Duration::from_secs(NOTICE_TTL_SECS),
            task_history: MAX_TASK_HISTORY,
        }
    }
}

impl DriveConfig {
    /// Replace the RPC endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Replace the object gateway. A trailing slash is dropped.
    pub fn with_gateway(mut self, gateway: impl Into<String>) -> Self {
        self.gateway = gateway.into().trim_end_matches('/').to_string();
        self
    }

    /// Parse a JSON override. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Self = serde_json::from_str(json)?;
        let gateway = config.gateway.clone();
        Ok(config.with_gateway(gateway))
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DriveConfig::default();
        assert_eq!(config.gateway, DEFAULT_GATEWAY);
        assert_eq!(config.notice_ttl, Duration::from_secs(5));
        assert_eq!(config.task_history, MAX_TASK_HISTORY);
    }

    #[test]
    fn test_json_override_keeps_defaults() {
        let config =
            DriveConfig::from_json(r#"{"gateway":"https://gw.example/","notice_ttl":2}"#).unwrap();
        assert_eq!(config.gateway, "https://gw.example");
        assert_eq!(config.notice_ttl, Duration::from_secs(2));
        assert_eq!(config.endpoint, DEFAULT_RPC_ENDPOINT);
    }

    #[test]
    fn test_json_override_rejects_garbage() {
        assert!(DriveConfig::from_json("not json").is_err());
    }
}
