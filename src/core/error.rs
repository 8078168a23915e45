//! Error types of the browser shell.
//!
//! - [`WalletError`] - wallet extension connection and request errors
//! - [`FetchError`] - gateway requests made by the size probe
//!
//! Both convert into [`SdkError`] where they cross into the orchestrator.

use std::fmt;

use scoop_core::SdkError;

/// Wallet-related errors for the injected Solana wallet provider.
#[derive(Debug, Clone)]
pub enum WalletError {
    /// Browser window not available
    NoWindow,
    /// Phantom or compatible wallet not installed
    NotInstalled,
    /// Failed to create request object
    RequestCreationFailed,
    /// Request to wallet was rejected by user
    RequestRejected(String),
    /// No public key returned from wallet
    NoAccount,
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWindow => write!(f, "Browser window not available"),
            Self::NotInstalled => write!(
                f,
                "No Solana wallet found. Please install the Phantom extension."
            ),
            Self::RequestCreationFailed => write!(f, "Failed to create wallet request"),
            Self::RequestRejected(msg) => write!(f, "Wallet request rejected: {}", msg),
            Self::NoAccount => write!(f, "No public key returned from wallet"),
        }
    }
}

impl std::error::Error for WalletError {}

/// Network/fetch-related errors for gateway requests.
#[derive(Debug, Clone)]
pub enum FetchError {
    /// Network request failed (CORS, offline, etc.)
    NetworkError(String),
    /// HTTP error response (non-2xx status)
    HttpError(u16),
    /// Request timed out
    Timeout,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkError(msg) => write!(f, "Network error: {}", msg),
            Self::HttpError(status) => write!(f, "HTTP error: {}", status),
            Self::Timeout => write!(f, "Request timed out"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<FetchError> for SdkError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::HttpError(404) => SdkError::NotFound(err.to_string()),
            other => SdkError::Network(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_into_sdk_error() {
        assert!(matches!(
            SdkError::from(FetchError::HttpError(404)),
            SdkError::NotFound(_)
        ));
        assert_eq!(
            SdkError::from(FetchError::Timeout),
            SdkError::Network("Request timed out".to_string())
        );
    }

    #[test]
    fn test_wallet_error_messages() {
        assert_eq!(
            WalletError::RequestRejected("User rejected the request.".into()).to_string(),
            "Wallet request rejected: User rejected the request."
        );
    }
}
