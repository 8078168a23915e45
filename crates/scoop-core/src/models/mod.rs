//! Data models shared by the caches, the coordinator and presentation.
//!
//! - [`Identity`], [`Address`] - wallet session as seen by the core
//! - [`StorageAccount`], [`AccountId`] - a quota-bounded drive
//! - [`FileEntry`], [`FileSize`], [`FileKind`] - one object in a drive
//! - [`SizeSpec`] - `"<integer><unit>"` capacity requests
//! - [`LoadState`] - what the last fetch of a cache produced

mod account;
mod file;
mod identity;
mod size;

pub use account::{AccountId, StorageAccount};
pub use file::{FileEntry, FileKind, FileSize, UploadFile, object_url};
pub use identity::{Address, Identity};
pub use size::{SizeSpec, SizeUnit};

use crate::error::DriveError;

/// Outcome of the most recent settled fetch for a cache key.
///
/// Kept apart from the cached data so a failed refresh can report an error
/// while the previous contents stay visible.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing fetched yet for this key.
    #[default]
    Unloaded,
    /// Data is present.
    Ready,
    /// The fetch succeeded with zero results.
    Empty,
    /// The last fetch failed; data from before it (if any) is retained.
    Failed(DriveError),
}

impl LoadState {
    /// True once a fetch has settled successfully, with or without results.
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Ready | Self::Empty)
    }

    /// Recompute the ready/empty distinction after a local projection.
    pub(crate) fn settle(&mut self, len: usize) {
        match self {
            Self::Ready | Self::Empty => {
                *self = if len == 0 { Self::Empty } else { Self::Ready };
            }
            Self::Unloaded | Self::Failed(_) => {}
        }
    }
}
