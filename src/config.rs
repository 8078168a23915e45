//! Application configuration.
//!
//! Centralizes the constants of the browser shell. Orchestrator settings
//! live in [`scoop_core::config`]; [`drive_config`] combines both.

use scoop_core::DriveConfig;

use crate::utils::dom;

// =============================================================================
// Application Metadata
// =============================================================================

/// Application name shown in the navigation bar and page title.
pub const APP_NAME: &str = "Scoop";

/// User tagline shown on the landing screen.
pub const APP_TAGLINE: &str = "Decentralized storage for your wallet";

// =============================================================================
// Network Configuration
// =============================================================================

/// Solana cluster the storage network runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cluster {
    #[default]
    MainnetBeta,
    Devnet,
}

impl Cluster {
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Self::Devnet => "https://api.devnet.solana.com",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::MainnetBeta => "mainnet-beta",
            Self::Devnet => "devnet",
        }
    }
}

/// Cluster used at startup.
pub const DEFAULT_CLUSTER: Cluster = Cluster::MainnetBeta;

/// Global under which the host page exposes the storage SDK adapter.
pub const SDK_GLOBAL: &str = "scoopDrive";

/// Id of the optional `<script type="application/json">` element holding a
/// [`DriveConfig`] override.
pub const CONFIG_ELEMENT_ID: &str = "scoop-config";

/// Size probe request timeout in milliseconds.
pub const PROBE_TIMEOUT_MS: u32 = 10_000;

// =============================================================================
// Wallet Configuration
// =============================================================================

/// localStorage key for wallet session persistence.
pub const WALLET_SESSION_KEY: &str = "wallet_session";

/// Wallet reconnect timeout in milliseconds.
pub const WALLET_TIMEOUT_MS: i32 = 2000;

// =============================================================================
// Drive Form Configuration
// =============================================================================

/// Initial amount shown in the create-drive form.
pub const DEFAULT_DRIVE_AMOUNT: u64 = 10;

/// Longest drive name the form accepts.
pub const MAX_DRIVE_NAME_LEN: usize = 32;

// =============================================================================
// UI Configuration
// =============================================================================

/// Icon theme selection.
///
/// Available themes:
/// - `Bootstrap` - Familiar, slightly bolder (default)
/// - `Lucide` - Minimal, thin strokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(dead_code)]
pub enum IconTheme {
    #[default]
    Bootstrap,
    Lucide,
}

/// Current icon theme used throughout the application.
/// Change this value to switch icon styles globally.
pub const ICON_THEME: IconTheme = IconTheme::Bootstrap;

/// Orchestrator configuration for `cluster`.
///
/// Values from the page's config element override the defaults; a malformed
/// element is logged and ignored.
pub fn drive_config(cluster: Cluster) -> DriveConfig {
    let base = dom::element_text(CONFIG_ELEMENT_ID)
        .and_then(|json| match DriveConfig::from_json(&json) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed drive config");
                None
            }
        })
        .unwrap_or_default();

    if base.endpoint == scoop_core::config::DEFAULT_RPC_ENDPOINT {
        base.with_endpoint(cluster.endpoint())
    } else {
        base
    }
}
