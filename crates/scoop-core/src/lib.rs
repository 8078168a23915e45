//! Client-side drive orchestration for a decentralized object-storage network.
//!
//! This crate owns the state a wallet-authenticated storage client keeps
//! between the wallet, the storage SDK and the presentation layer:
//!
//! - [`StorageClient`] - lazily built, identity-bound SDK handle
//! - [`AccountDirectory`] - storage accounts owned by the current identity
//! - [`FileListing`] - per-account object keys with lazily probed sizes
//! - [`MutationCoordinator`] - create/delete/upload/toggle with apply-on-confirm
//! - [`Notifier`] - single-slot, last-writer-wins status channel
//! - [`DriveSession`] - wires the above to identity and selection changes
//!
//! Everything here is single-threaded and cooperative: shared state lives in
//! `Rc<RefCell<_>>`, and no borrow is ever held across an `.await`.

pub mod client;
pub mod config;
pub mod coordinator;
pub mod directory;
pub mod error;
pub mod format;
mod inflight;
pub mod listing;
pub mod models;
pub mod notify;
pub mod sdk;
pub mod session;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use client::{StorageClient, StorageHandle};
pub use config::DriveConfig;
pub use coordinator::{
    MutationCoordinator, MutationKind, MutationTarget, MutationTask, TaskId, TaskOutcome,
    TaskStatus,
};
pub use directory::{AccountDirectory, DirectorySnapshot};
pub use error::{DriveError, SdkError};
pub use listing::{FileListing, FileQuery, ListingSnapshot, SortKey, SortOrder};
pub use models::{
    AccountId, Address, FileEntry, FileKind, FileSize, Identity, LoadState, SizeSpec, SizeUnit,
    StorageAccount, UploadFile,
};
pub use notify::{Notice, NoticeKind, Notifier};
pub use sdk::{
    AccountInfo, CreatedAccount, SdkConnector, Signature, SizeProbe, StorageSdk, UploadReceipt,
};
pub use session::DriveSession;
