//! Mutation coordinator.
//!
//! Every user action becomes a [`MutationTask`] that starts `Pending` and
//! settles exactly once. Local preconditions (connection, ownership,
//! mutability, input) are checked before any network call. A cache is
//! patched only after the remote call has been confirmed, and only if the
//! handle that issued it still belongs to the current identity, so a failed
//! or stale mutation never touches local state.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::client::{StorageClient, StorageHandle};
use crate::directory::AccountDirectory;
use crate::error::DriveError;
use crate::listing::FileListing;
use crate::models::{AccountId, FileSize, SizeSpec, StorageAccount, UploadFile};
use crate::notify::{NoticeKind, Notifier};
use crate::sdk::Signature;

// ============================================================================
// Tasks
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MutationKind {
    CreateAccount,
    DeleteAccount,
    ToggleImmutable,
    UploadFile,
    DeleteFile,
}

impl MutationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateAccount => "create storage account",
            Self::DeleteAccount => "delete storage account",
            Self::ToggleImmutable => "make storage immutable",
            Self::UploadFile => "upload file",
            Self::DeleteFile => "delete file",
        }
    }

    /// Shown while the remote call is in flight.
    pub fn loading_message(self) -> &'static str {
        match self {
            Self::CreateAccount => "Creating new drive...",
            Self::DeleteAccount => "Deleting storage account...",
            Self::ToggleImmutable => "Making storage account immutable...",
            Self::UploadFile => "Uploading File...",
            Self::DeleteFile => "Deleting file...",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Self::CreateAccount => "Drive created!",
            Self::DeleteAccount => "Storage account deleted.",
            Self::ToggleImmutable => "Drive is now Immutable!",
            Self::UploadFile => "File Uploaded!",
            Self::DeleteFile => "File deleted.",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a task acts on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationTarget {
    NewAccount { name: String },
    Account(AccountId),
    File { account: AccountId, name: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Succeeded,
    Failed,
}

/// Result carried by a settled task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskOutcome {
    Created(AccountId),
    Confirmed(Signature),
    /// Public location of the uploaded object.
    Uploaded(String),
    Failed(DriveError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationTask {
    pub id: TaskId,
    pub kind: MutationKind,
    pub target: MutationTarget,
    pub status: TaskStatus,
    pub outcome: Option<TaskOutcome>,
}

impl MutationTask {
    fn new(id: TaskId, kind: MutationKind, target: MutationTarget) -> Self {
        Self {
            id,
            kind,
            target,
            status: TaskStatus::Pending,
            outcome: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    /// Move to a terminal state. Returns `false` if already settled.
    fn settle(&mut self, outcome: TaskOutcome) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.status = match outcome {
            TaskOutcome::Failed(_) => TaskStatus::Failed,
            _ => TaskStatus::Succeeded,
        };
        self.outcome = Some(outcome);
        true
    }
}

/// Bounded task history. Pending tasks are never evicted.
struct TaskLog {
    tasks: VecDeque<MutationTask>,
    next_id: u64,
    capacity: usize,
}

impl TaskLog {
    fn new(capacity: usize) -> Self {
        Self {
            tasks: VecDeque::new(),
            next_id: 0,
            capacity,
        }
    }

    fn open(&mut self, kind: MutationKind, target: MutationTarget) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.tasks.push_back(MutationTask::new(id, kind, target));
        self.evict();
        id
    }

    fn settle(&mut self, id: TaskId, outcome: TaskOutcome) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.settle(outcome);
        }
        self.evict();
    }

    fn evict(&mut self) {
        while self.tasks.len() > self.capacity {
            let Some(oldest) = self.tasks.iter().position(|t| !t.is_pending()) else {
                break;
            };
            self.tasks.remove(oldest);
        }
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Issues mutations through the current storage handle and projects their
/// confirmed effects onto the caches.
#[derive(Clone)]
pub struct MutationCoordinator {
    client: StorageClient,
    directory: AccountDirectory,
    listing: FileListing,
    notifier: Notifier,
    tasks: Rc<RefCell<TaskLog>>,
}

impl MutationCoordinator {
    pub fn new(
        client: StorageClient,
        directory: AccountDirectory,
        listing: FileListing,
        notifier: Notifier,
        task_history: usize,
    ) -> Self {
        Self {
            client,
            directory,
            listing,
            notifier,
            tasks: Rc::new(RefCell::new(TaskLog::new(task_history))),
        }
    }

    /// Task history, oldest first.
    pub fn tasks(&self) -> Vec<MutationTask> {
        self.tasks.borrow().tasks.iter().cloned().collect()
    }

    pub fn task(&self, id: TaskId) -> Option<MutationTask> {
        self.tasks.borrow().tasks.iter().find(|t| t.id == id).cloned()
    }

    pub fn pending(&self) -> usize {
        self.tasks.borrow().tasks.iter().filter(|t| t.is_pending()).count()
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Reserve a new storage account of `size` (e.g. `"500MB"`) named `name`.
    ///
    /// Yields the new account id.
    pub async fn create_account(&self, name: &str, size: &str) -> Result<AccountId, DriveError> {
        let name = name.trim().to_string();
        let kind = MutationKind::CreateAccount;
        let target = MutationTarget::NewAccount { name: name.clone() };

        self.track(kind, target, TaskOutcome::Created, async {
            if name.is_empty() {
                return Err(DriveError::InvalidRequest("drive name is required".into()));
            }
            let spec: SizeSpec = size.parse()?;
            let handle = self.client.handle().await?;

            self.dispatch(kind);
            let created = handle
                .sdk()
                .create_storage_account(&name, &spec)
                .await
                .map_err(|e| DriveError::mutation(kind, e))?;

            let id = created.shdw_bucket;
            if self.confirmed(&handle, kind) {
                let account =
                    StorageAccount::created(id.clone(), name, handle.owner().clone(), spec.bytes());
                self.directory.apply_create(account);
            }
            Ok(id)
        })
        .await
    }

    /// Delete an owned, mutable storage account.
    pub async fn delete_account(&self, id: &AccountId) -> Result<Signature, DriveError> {
        let kind = MutationKind::DeleteAccount;

        self.track(kind, MutationTarget::Account(id.clone()), TaskOutcome::Confirmed, async {
            let account = self.owned(id)?;
            if account.immutable {
                return Err(DriveError::Immutable(id.clone()));
            }
            let handle = self.client.handle().await?;

            self.dispatch(kind);
            let signature = handle
                .sdk()
                .delete_storage_account(id)
                .await
                .map_err(|e| DriveError::mutation(kind, e))?;

            if self.confirmed(&handle, kind) {
                self.directory.apply_delete(id);
                self.listing.forget(id);
            }
            Ok(signature)
        })
        .await
    }

    /// Make an owned account immutable. One-directional: an account that is
    /// already immutable is rejected with [`DriveError::Immutable`].
    pub async fn toggle_immutable(&self, id: &AccountId) -> Result<Signature, DriveError> {
        let kind = MutationKind::ToggleImmutable;

        self.track(kind, MutationTarget::Account(id.clone()), TaskOutcome::Confirmed, async {
            let account = self.owned(id)?;
            if account.immutable {
                return Err(DriveError::Immutable(id.clone()));
            }
            let handle = self.client.handle().await?;

            self.dispatch(kind);
            let signature = handle
                .sdk()
                .make_storage_immutable(id)
                .await
                .map_err(|e| DriveError::mutation(kind, e))?;

            if self.confirmed(&handle, kind) {
                self.directory.apply_immutable(id);
            }
            Ok(signature)
        })
        .await
    }

    /// Upload `file` into an owned account. Immutable accounts accept new
    /// objects.
    ///
    /// Yields the object's public location.
    pub async fn upload_file(&self, id: &AccountId, file: UploadFile) -> Result<String, DriveError> {
        let kind = MutationKind::UploadFile;
        let target = MutationTarget::File {
            account: id.clone(),
            name: file.name.clone(),
        };

        self.track(kind, target, TaskOutcome::Uploaded, async {
            self.owned(id)?;
            if file.name.trim().is_empty() {
                return Err(DriveError::InvalidRequest("file name is required".into()));
            }
            if file.is_empty() {
                return Err(DriveError::InvalidRequest(format!(
                    "'{}' is empty",
                    file.name
                )));
            }
            let handle = self.client.handle().await?;

            self.dispatch(kind);
            let receipt = handle
                .sdk()
                .upload_file(id, &file)
                .await
                .map_err(|e| DriveError::mutation(kind, e))?;

            let location = receipt
                .finalized_locations
                .first()
                .cloned()
                .unwrap_or_else(|| self.listing.url(id, &file.name));
            if self.confirmed(&handle, kind) {
                self.listing
                    .apply_upload(id, &file.name, FileSize::Known(file.len()));
            }
            Ok(location)
        })
        .await
    }

    /// Delete one object from an owned, mutable account.
    pub async fn delete_file(&self, id: &AccountId, name: &str) -> Result<Signature, DriveError> {
        let kind = MutationKind::DeleteFile;
        let target = MutationTarget::File {
            account: id.clone(),
            name: name.to_string(),
        };

        self.track(kind, target, TaskOutcome::Confirmed, async {
            let account = self.owned(id)?;
            if account.immutable {
                return Err(DriveError::Immutable(id.clone()));
            }
            let handle = self.client.handle().await?;

            self.dispatch(kind);
            let url = self.listing.url(id, name);
            let signature = handle
                .sdk()
                .delete_file(id, &url)
                .await
                .map_err(|e| DriveError::mutation(kind, e))?;

            if self.confirmed(&handle, kind) {
                self.listing.apply_delete(id, name);
            }
            Ok(signature)
        })
        .await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Cached metadata for `id`, provided the connected identity owns it.
    fn owned(&self, id: &AccountId) -> Result<StorageAccount, DriveError> {
        let identity = self.client.identity();
        let owner = identity.active().ok_or(DriveError::NotConnected)?;
        let account = self
            .directory
            .account(id)
            .ok_or_else(|| DriveError::UnknownAccount(id.clone()))?;
        if !account.is_owned_by(owner) {
            return Err(DriveError::OwnershipDenied(id.clone()));
        }
        Ok(account)
    }

    fn dispatch(&self, kind: MutationKind) {
        debug!(op = %kind, "dispatching mutation");
        self.notifier.publish(kind.loading_message(), NoticeKind::Loading);
    }

    /// True if the caches may take the confirmed effect of a call made
    /// through `handle`.
    fn confirmed(&self, handle: &StorageHandle, kind: MutationKind) -> bool {
        let current = self.client.is_current(handle);
        if !current {
            debug!(op = %kind, "identity changed during mutation, skipping cache update");
        }
        current
    }

    /// Run `work` as a tracked task and publish its outcome.
    async fn track<T, Fut>(
        &self,
        kind: MutationKind,
        target: MutationTarget,
        outcome: fn(T) -> TaskOutcome,
        work: Fut,
    ) -> Result<T, DriveError>
    where
        T: Clone,
        Fut: Future<Output = Result<T, DriveError>>,
    {
        let id = self.tasks.borrow_mut().open(kind, target);
        let result = work.await;

        match &result {
            Ok(value) => {
                info!(op = %kind, task = id.0, "mutation confirmed");
                self.tasks.borrow_mut().settle(id, outcome(value.clone()));
                self.notifier
                    .publish(kind.success_message(), NoticeKind::Success);
            }
            Err(err) => {
                warn!(op = %kind, task = id.0, error = %err, "mutation failed");
                self.tasks
                    .borrow_mut()
                    .settle(id, TaskOutcome::Failed(err.clone()));
                if *err != DriveError::Superseded {
                    self.notifier.publish(err.to_string(), NoticeKind::Error);
                }
            }
        }
        result
    }
}
