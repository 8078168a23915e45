//! Error types for the orchestration core.
//!
//! - [`SdkError`] - a call into the external storage SDK or gateway failed
//! - [`DriveError`] - what callers of the caches and the coordinator see
//!
//! Both are `Clone` because a de-duplicated fetch hands the same result to
//! every caller that attached to it.

use thiserror::Error;

use crate::coordinator::MutationKind;
use crate::models::AccountId;

/// Failure reported by the storage SDK or the object gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkError {
    /// Transport failure (timeout, CORS, RPC unreachable).
    #[error("network error: {0}")]
    Network(String),
    /// The wallet or the program rejected the transaction.
    #[error("transaction rejected: {0}")]
    Rejected(String),
    /// The requested account or object does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The SDK answered with something we could not interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors surfaced by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriveError {
    /// No wallet identity, or the wallet is disconnected.
    #[error("wallet is not connected")]
    NotConnected,
    /// A read failed; previously cached data stays available.
    #[error("failed to fetch {what}: {source}")]
    Fetch { what: &'static str, source: SdkError },
    /// The identity owns no storage accounts yet. Not a failure.
    #[error("no storage accounts yet, create one to get started")]
    Empty,
    /// A remote create/delete/upload/toggle call failed.
    #[error("{op} failed: {source}")]
    Mutation { op: MutationKind, source: SdkError },
    /// The connected identity does not own the target account.
    #[error("account {0} is not owned by the connected wallet")]
    OwnershipDenied(AccountId),
    /// The target account is in no cache, so ownership cannot be checked.
    #[error("unknown storage account {0}")]
    UnknownAccount(AccountId),
    /// The target account is immutable.
    #[error("storage account {0} is immutable")]
    Immutable(AccountId),
    /// Malformed user input, rejected before dispatch.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The fetch was overtaken by a newer one and its result dropped.
    #[error("request superseded by a newer one")]
    Superseded,
}

impl DriveError {
    /// Wrap an SDK read failure.
    pub fn fetch(what: &'static str, source: SdkError) -> Self {
        Self::Fetch { what, source }
    }

    /// Wrap an SDK mutation failure.
    pub fn mutation(op: MutationKind, source: SdkError) -> Self {
        Self::Mutation { op, source }
    }

    /// True for the valid zero-result state.
    pub fn is_empty_state(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// True when the failure was decided locally, before any network call.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::NotConnected
                | Self::OwnershipDenied(_)
                | Self::UnknownAccount(_)
                | Self::Immutable(_)
                | Self::InvalidRequest(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DriveError::fetch("storage accounts", SdkError::Network("timeout".into()));
        assert_eq!(
            err.to_string(),
            "failed to fetch storage accounts: network error: timeout"
        );

        let err = DriveError::mutation(
            MutationKind::DeleteFile,
            SdkError::Rejected("user declined".into()),
        );
        assert_eq!(
            err.to_string(),
            "delete file failed: transaction rejected: user declined"
        );
    }

    #[test]
    fn test_classification() {
        assert!(DriveError::Empty.is_empty_state());
        assert!(!DriveError::NotConnected.is_empty_state());
        assert!(DriveError::OwnershipDenied(AccountId::new("a")).is_local());
        assert!(!DriveError::Superseded.is_local());
        assert!(
            !DriveError::fetch("x", SdkError::NotFound("x".into())).is_local()
        );
    }
}
