//! Cache of the storage accounts owned by the current identity.
//!
//! The owned set is replaced wholesale by [`AccountDirectory::refresh`] and
//! patched in place by the `apply_*` projections once a mutation has been
//! confirmed. Every fetch is tagged with the owner and a generation number;
//! a result that arrives after the identity changed, or after a newer fetch
//! was started, is dropped.
//!
//! Projections applied while a fetch is pending are journalled and replayed
//! onto that fetch's result, so a refresh racing a confirmed mutation never
//! undoes it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use futures::future::try_join_all;
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::client::StorageHandle;
use crate::error::{DriveError, SdkError};
use crate::inflight::InFlight;
use crate::models::{AccountId, Address, LoadState, StorageAccount};

/// Point-in-time, read-only view of the directory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DirectorySnapshot {
    pub owner: Option<Address>,
    pub accounts: Vec<StorageAccount>,
    pub load: LoadState,
    /// A fetch is in flight.
    pub loading: bool,
}

impl DirectorySnapshot {
    /// Loaded successfully with zero accounts: the "create one" state.
    pub fn is_empty_state(&self) -> bool {
        self.load == LoadState::Empty && self.accounts.is_empty()
    }
}

#[derive(Clone, Debug)]
enum Projection {
    Create(StorageAccount),
    Delete(AccountId),
    Immutable(AccountId),
}

#[derive(Default)]
struct DirectoryState {
    owner: Option<Address>,
    accounts: IndexMap<AccountId, StorageAccount>,
    /// Accounts looked up by id, owned or not.
    inspected: HashMap<AccountId, StorageAccount>,
    load: LoadState,
    /// Bumped on rebind and reset.
    epoch: u64,
    /// Bumped on every fetch start and on reset.
    generation: u64,
    /// Generation of the fetch in flight.
    pending: Option<u64>,
    journal: Vec<Projection>,
}

impl DirectoryState {
    /// Switch to `owner`, returning whether anything changed.
    fn rebind(&mut self, owner: &Address) -> bool {
        if self.owner.as_ref() == Some(owner) {
            return false;
        }
        debug!(owner = %owner, "account directory rebound");
        *self = Self {
            owner: Some(owner.clone()),
            epoch: self.epoch + 1,
            generation: self.generation + 1,
            ..Self::default()
        };
        true
    }

    fn project(&mut self, projection: &Projection) -> bool {
        match projection {
            Projection::Create(account) => {
                if self.accounts.contains_key(&account.id) {
                    return false;
                }
                self.accounts.insert(account.id.clone(), account.clone());
            }
            Projection::Delete(id) => {
                self.inspected.remove(id);
                if self.accounts.shift_remove(id).is_none() {
                    return false;
                }
            }
            Projection::Immutable(id) => {
                if let Some(account) = self.inspected.get_mut(id) {
                    account.immutable = true;
                }
                match self.accounts.get_mut(id) {
                    Some(account) if !account.immutable => account.immutable = true,
                    _ => return false,
                }
            }
        }
        let len = self.accounts.len();
        self.load.settle(len);
        true
    }

    fn record(&mut self, projection: Projection) -> bool {
        let changed = self.project(&projection);
        if self.pending.is_some() {
            self.journal.push(projection);
        }
        changed
    }
}

/// Owned-account cache for the current identity.
#[derive(Clone)]
pub struct AccountDirectory {
    state: Rc<RefCell<DirectoryState>>,
    inflight: InFlight<Address, Vec<StorageAccount>>,
    inspecting: InFlight<AccountId, StorageAccount>,
}

impl Default for AccountDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountDirectory {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(DirectoryState::default())),
            inflight: InFlight::new(),
            inspecting: InFlight::new(),
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn snapshot(&self) -> DirectorySnapshot {
        let state = self.state.borrow();
        DirectorySnapshot {
            owner: state.owner.clone(),
            accounts: state.accounts.values().cloned().collect(),
            load: state.load.clone(),
            loading: state.pending.is_some(),
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.state.borrow().load.clone()
    }

    pub fn owner(&self) -> Option<Address> {
        self.state.borrow().owner.clone()
    }

    pub fn ids(&self) -> Vec<AccountId> {
        self.state.borrow().accounts.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached metadata for `id`: the owned set first, then inspected accounts.
    pub fn account(&self, id: &AccountId) -> Option<StorageAccount> {
        let state = self.state.borrow();
        state
            .accounts
            .get(id)
            .or_else(|| state.inspected.get(id))
            .cloned()
    }

    // ========================================================================
    // Fetches
    // ========================================================================

    /// Bind to `owner`. Fetches started for an earlier owner are detached,
    /// so a later request for any owner starts its own.
    fn rebind(&self, owner: &Address) {
        if self.state.borrow_mut().rebind(owner) {
            self.inflight.clear();
            self.inspecting.clear();
        }
    }

    /// Fetch the owned set, attaching to a fetch already in flight for the
    /// same identity.
    ///
    /// Zero accounts settles as [`DriveError::Empty`]. A failed fetch keeps
    /// the previous contents.
    pub async fn refresh(&self, handle: &StorageHandle) -> Result<Vec<StorageAccount>, DriveError> {
        self.rebind(handle.owner());
        let fetch = self.inflight.join_or_start(handle.owner().clone(), || {
            fetch(Rc::clone(&self.state), handle.clone())
        });
        fetch.await
    }

    /// Start a new fetch even if one is pending. The older one's result is
    /// discarded when it arrives.
    pub async fn reload(&self, handle: &StorageHandle) -> Result<Vec<StorageAccount>, DriveError> {
        self.rebind(handle.owner());
        let fetch = self.inflight.start(
            handle.owner().clone(),
            fetch(Rc::clone(&self.state), handle.clone()),
        );
        fetch.await
    }

    /// Fetch only if nothing has been loaded for this identity yet.
    pub async fn ensure_loaded(
        &self,
        handle: &StorageHandle,
    ) -> Result<Vec<StorageAccount>, DriveError> {
        self.rebind(handle.owner());
        {
            let state = self.state.borrow();
            match state.load {
                LoadState::Ready => return Ok(state.accounts.values().cloned().collect()),
                LoadState::Empty => return Err(DriveError::Empty),
                LoadState::Unloaded | LoadState::Failed(_) => {}
            }
        }
        self.refresh(handle).await
    }

    /// Fetch metadata for any account by id, owned or not.
    pub async fn inspect(
        &self,
        handle: &StorageHandle,
        id: &AccountId,
    ) -> Result<StorageAccount, DriveError> {
        let epoch = self.state.borrow().epoch;
        let fetch = self.inspecting.join_or_start(id.clone(), || {
            let state = Rc::clone(&self.state);
            let handle = handle.clone();
            let id = id.clone();
            async move {
                let info = handle
                    .sdk()
                    .get_storage_account(&id)
                    .await
                    .map_err(|e| DriveError::fetch("storage account", e))?;
                let account = info.into_account(id.clone());

                let mut state = state.borrow_mut();
                if state.epoch == epoch {
                    if let Some(owned) = state.accounts.get_mut(&id) {
                        *owned = account.clone();
                    }
                    state.inspected.insert(id, account.clone());
                }
                Ok(account)
            }
        });
        fetch.await
    }

    // ========================================================================
    // Projections
    // ========================================================================

    /// Add a just-created account. A no-op when the id is already present or
    /// the account belongs to another identity.
    pub fn apply_create(&self, account: StorageAccount) -> bool {
        let mut state = self.state.borrow_mut();
        match &state.owner {
            Some(owner) if owner != &account.owner => {
                warn!(id = %account.id, "ignoring created account for another identity");
                return false;
            }
            Some(_) => {}
            None => state.owner = Some(account.owner.clone()),
        }
        state.record(Projection::Create(account))
    }

    /// Remove an account. Absent ids are a no-op.
    pub fn apply_delete(&self, id: &AccountId) -> bool {
        self.state
            .borrow_mut()
            .record(Projection::Delete(id.clone()))
    }

    /// Mark an account immutable. Idempotent.
    pub fn apply_immutable(&self, id: &AccountId) -> bool {
        self.state
            .borrow_mut()
            .record(Projection::Immutable(id.clone()))
    }

    /// Drop everything, including pending fetch results still to arrive.
    pub fn reset(&self) {
        let mut state = self.state.borrow_mut();
        *state = DirectoryState {
            epoch: state.epoch + 1,
            generation: state.generation + 1,
            ..DirectoryState::default()
        };
        self.inflight.clear();
        self.inspecting.clear();
    }
}

/// Start a tagged fetch of the owned set and settle its result into `state`.
fn fetch(
    state: Rc<RefCell<DirectoryState>>,
    handle: StorageHandle,
) -> impl Future<Output = Result<Vec<StorageAccount>, DriveError>> {
    let generation = {
        let mut state = state.borrow_mut();
        state.generation += 1;
        state.pending = Some(state.generation);
        state.generation
    };
    let owner = handle.owner().clone();
    debug!(owner = %owner, generation, "fetching storage accounts");

    async move {
        let result = fetch_accounts(&handle).await;

        let mut state = state.borrow_mut();
        if state.owner.as_ref() != Some(&owner) || state.generation != generation {
            debug!(owner = %owner, generation, "discarding stale account fetch");
            return Err(DriveError::Superseded);
        }
        state.pending = None;
        let journal = std::mem::take(&mut state.journal);

        match result {
            Ok(accounts) => {
                state.accounts = accounts
                    .into_iter()
                    .map(|account| (account.id.clone(), account))
                    .collect();
                state.load = LoadState::Ready;
                for projection in &journal {
                    state.project(projection);
                }
                let len = state.accounts.len();
                state.load.settle(len);
                debug!(count = len, replayed = journal.len(), "storage accounts loaded");

                if len == 0 {
                    Err(DriveError::Empty)
                } else {
                    Ok(state.accounts.values().cloned().collect())
                }
            }
            Err(err) => {
                warn!(error = %err, "storage account fetch failed");
                state.load = LoadState::Failed(err.clone());
                Err(err)
            }
        }
    }
}

async fn fetch_accounts(handle: &StorageHandle) -> Result<Vec<StorageAccount>, DriveError> {
    let ids = handle
        .sdk()
        .get_storage_accounts()
        .await
        .map_err(|e| DriveError::fetch("storage accounts", e))?;

    let lookups = ids.into_iter().map(|id| async move {
        let info = handle.sdk().get_storage_account(&id).await?;
        Ok::<_, SdkError>(info.into_account(id))
    });
    try_join_all(lookups)
        .await
        .map_err(|e| DriveError::fetch("storage account metadata", e))
}
