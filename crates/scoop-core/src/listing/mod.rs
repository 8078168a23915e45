//! Per-account cache of object keys.
//!
//! Names are fetched with [`FileListing::list_keys`]; sizes are filled in
//! afterwards by independent header probes that can only ever degrade a
//! file to [`FileSize::Unknown`], never fail the listing. Uploads and
//! deletions are projected in once confirmed, journalled like the account
//! directory's so a racing refresh cannot revert them.

mod view;

pub use view::{FileQuery, SortKey, SortOrder};

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use futures::future::join_all;
use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::{debug, warn};

use crate::client::StorageHandle;
use crate::error::DriveError;
use crate::inflight::InFlight;
use crate::models::{AccountId, FileEntry, FileSize, LoadState, object_url};
use crate::sdk::SizeProbe;

/// Read-only view of one account's listing.
#[derive(Clone, Debug, PartialEq)]
pub struct ListingSnapshot {
    pub account: AccountId,
    pub files: Vec<FileEntry>,
    pub load: LoadState,
    pub loading: bool,
}

#[derive(Clone, Debug)]
enum FileProjection {
    Upload(FileEntry),
    Delete(String),
}

#[derive(Default)]
struct AccountFiles {
    files: IndexMap<String, FileEntry>,
    load: LoadState,
    /// Generation of the fetch in flight.
    pending: Option<u64>,
    journal: Vec<FileProjection>,
}

impl AccountFiles {
    fn project(&mut self, projection: &FileProjection) -> bool {
        let changed = match projection {
            FileProjection::Upload(entry) => match self.files.entry(entry.name.clone()) {
                Entry::Occupied(_) => false,
                Entry::Vacant(slot) => {
                    slot.insert(entry.clone());
                    true
                }
            },
            FileProjection::Delete(name) => self.files.shift_remove(name).is_some(),
        };
        let len = self.files.len();
        self.load.settle(len);
        changed
    }

    fn record(&mut self, projection: FileProjection) -> bool {
        let changed = self.project(&projection);
        if self.pending.is_some() {
            self.journal.push(projection);
        }
        changed
    }
}

#[derive(Default)]
struct ListingState {
    accounts: HashMap<AccountId, AccountFiles>,
    /// Bumped on reset; probes and fetches from an older epoch are dropped.
    epoch: u64,
    generation: u64,
}

/// File listings keyed by account id.
#[derive(Clone)]
pub struct FileListing {
    state: Rc<RefCell<ListingState>>,
    inflight: InFlight<AccountId, Vec<String>>,
    probing: InFlight<(AccountId, String), FileSize>,
    probe: Rc<dyn SizeProbe>,
    gateway: Rc<str>,
}

impl FileListing {
    pub fn new(probe: Rc<dyn SizeProbe>, gateway: impl Into<String>) -> Self {
        Self {
            state: Rc::new(RefCell::new(ListingState::default())),
            inflight: InFlight::new(),
            probing: InFlight::new(),
            probe,
            gateway: Rc::from(gateway.into().trim_end_matches('/')),
        }
    }

    pub fn gateway(&self) -> &str {
        &self.gateway
    }

    /// Public URL of an object.
    pub fn url(&self, account: &AccountId, name: &str) -> String {
        object_url(&self.gateway, account, name)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn snapshot(&self, account: &AccountId) -> ListingSnapshot {
        let state = self.state.borrow();
        let files = state.accounts.get(account);
        ListingSnapshot {
            account: account.clone(),
            files: files
                .map(|f| f.files.values().cloned().collect())
                .unwrap_or_default(),
            load: files.map(|f| f.load.clone()).unwrap_or_default(),
            loading: files.is_some_and(|f| f.pending.is_some()),
        }
    }

    pub fn names(&self, account: &AccountId) -> Vec<String> {
        self.state
            .borrow()
            .accounts
            .get(account)
            .map(|f| f.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn file(&self, account: &AccountId, name: &str) -> Option<FileEntry> {
        self.state
            .borrow()
            .accounts
            .get(account)
            .and_then(|f| f.files.get(name).cloned())
    }

    pub fn load_state(&self, account: &AccountId) -> LoadState {
        self.state
            .borrow()
            .accounts
            .get(account)
            .map(|f| f.load.clone())
            .unwrap_or_default()
    }

    /// Tiled view: every file, in listing order.
    pub fn tiles(&self, account: &AccountId) -> Vec<FileEntry> {
        self.snapshot(account).files
    }

    /// Tabular view: filtered and sorted per `query`.
    pub fn table(&self, account: &AccountId, query: &FileQuery) -> Vec<FileEntry> {
        query.apply(self.snapshot(account).files)
    }

    // ========================================================================
    // Fetches
    // ========================================================================

    /// Fetch the object keys of `account`, attaching to a fetch already in
    /// flight for it.
    ///
    /// An account with no objects settles as [`LoadState::Empty`] and
    /// returns an empty list; only transport failures are errors.
    pub async fn list_keys(
        &self,
        handle: &StorageHandle,
        account: &AccountId,
    ) -> Result<Vec<String>, DriveError> {
        let fetch = self.inflight.join_or_start(account.clone(), || {
            fetch(Rc::clone(&self.state), handle.clone(), account.clone())
        });
        fetch.await
    }

    /// Start a new fetch, superseding any pending one for `account`.
    pub async fn reload(
        &self,
        handle: &StorageHandle,
        account: &AccountId,
    ) -> Result<Vec<String>, DriveError> {
        let fetch = self.inflight.start(
            account.clone(),
            fetch(Rc::clone(&self.state), handle.clone(), account.clone()),
        );
        fetch.await
    }

    /// Fetch only if `account` has not been loaded yet.
    pub async fn ensure_loaded(
        &self,
        handle: &StorageHandle,
        account: &AccountId,
    ) -> Result<Vec<String>, DriveError> {
        if self.load_state(account).is_loaded() {
            return Ok(self.names(account));
        }
        self.list_keys(handle, account).await
    }

    /// Probe the size of one object.
    ///
    /// Never fails: a missing length or a failed probe yields
    /// [`FileSize::Unknown`]. A size that is already resolved is returned
    /// without probing.
    pub async fn resolve_size(&self, account: &AccountId, name: &str) -> FileSize {
        if let Some(size) = self
            .file(account, name)
            .map(|f| f.size)
            .filter(FileSize::is_resolved)
        {
            return size;
        }

        let key = (account.clone(), name.to_string());
        let probe = self.probing.join_or_start(key, || {
            let state = Rc::clone(&self.state);
            let probe = Rc::clone(&self.probe);
            let url = self.url(account, name);
            let epoch = self.state.borrow().epoch;
            let account = account.clone();
            let name = name.to_string();
            async move {
                let size = match probe.content_length(&url).await {
                    Ok(Some(bytes)) => FileSize::Known(bytes),
                    Ok(None) => FileSize::Unknown,
                    Err(err) => {
                        warn!(url = %url, error = %err, "size probe failed");
                        FileSize::Unknown
                    }
                };

                let mut state = state.borrow_mut();
                if state.epoch == epoch {
                    let entry = state
                        .accounts
                        .get_mut(&account)
                        .and_then(|f| f.files.get_mut(&name));
                    if let Some(entry) = entry.filter(|e| !e.size.is_resolved()) {
                        entry.size = size;
                    }
                }
                Ok(size)
            }
        });
        probe.await.unwrap_or(FileSize::Unknown)
    }

    /// Probe every unresolved size of `account` concurrently.
    pub async fn resolve_sizes(&self, account: &AccountId) {
        let pending: Vec<String> = self
            .snapshot(account)
            .files
            .into_iter()
            .filter(|f| !f.size.is_resolved())
            .map(|f| f.name)
            .collect();
        if pending.is_empty() {
            return;
        }
        debug!(account = %account, count = pending.len(), "resolving file sizes");
        join_all(pending.iter().map(|name| self.resolve_size(account, name))).await;
    }

    // ========================================================================
    // Projections
    // ========================================================================

    /// Register a just-uploaded file.
    ///
    /// Rejected with a warning when the name is already listed; ignored when
    /// the account has never been fetched (its next fetch will include it).
    pub fn apply_upload(&self, account: &AccountId, name: &str, size: FileSize) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(files) = state.accounts.get_mut(account) else {
            debug!(account = %account, file = name, "upload for an unlisted account");
            return false;
        };
        if files.files.contains_key(name) {
            warn!(account = %account, file = name, "file already listed, ignoring upload");
            return false;
        }
        let entry = FileEntry::new(account.clone(), name).with_size(size);
        files.record(FileProjection::Upload(entry))
    }

    /// Remove a file. Absent names are a no-op.
    pub fn apply_delete(&self, account: &AccountId, name: &str) -> bool {
        let mut state = self.state.borrow_mut();
        match state.accounts.get_mut(account) {
            Some(files) => files.record(FileProjection::Delete(name.to_string())),
            None => false,
        }
    }

    /// Drop one account's listing, discarding any fetch still in flight.
    pub fn forget(&self, account: &AccountId) {
        self.state.borrow_mut().accounts.remove(account);
        self.inflight.remove(account);
    }

    /// Drop every listing.
    pub fn reset(&self) {
        let mut state = self.state.borrow_mut();
        state.accounts.clear();
        state.epoch += 1;
        self.inflight.clear();
        self.probing.clear();
    }
}

/// Start a tagged key fetch for `account` and settle it into `state`.
fn fetch(
    state: Rc<RefCell<ListingState>>,
    handle: StorageHandle,
    account: AccountId,
) -> impl Future<Output = Result<Vec<String>, DriveError>> {
    let (epoch, generation) = {
        let mut state = state.borrow_mut();
        state.generation += 1;
        let generation = state.generation;
        state.accounts.entry(account.clone()).or_default().pending = Some(generation);
        (state.epoch, generation)
    };
    debug!(account = %account, generation, "listing objects");

    async move {
        let result = handle
            .sdk()
            .list_objects(&account)
            .await
            .map_err(|e| DriveError::fetch("file list", e));

        let mut state = state.borrow_mut();
        let current = state.epoch == epoch;
        let Some(files) = state
            .accounts
            .get_mut(&account)
            .filter(|f| current && f.pending == Some(generation))
        else {
            debug!(account = %account, generation, "discarding stale file listing");
            return Err(DriveError::Superseded);
        };
        files.pending = None;
        let journal = std::mem::take(&mut files.journal);

        match result {
            Ok(names) => {
                let mut fresh = IndexMap::with_capacity(names.len());
                for name in names {
                    if fresh.contains_key(&name) {
                        warn!(account = %account, file = %name, "duplicate object key in listing");
                        continue;
                    }
                    let size = files.files.get(&name).map(|f| f.size).unwrap_or_default();
                    let entry = FileEntry::new(account.clone(), name.clone()).with_size(size);
                    fresh.insert(name, entry);
                }
                files.files = fresh;
                files.load = LoadState::Ready;
                for projection in &journal {
                    files.project(projection);
                }
                let len = files.files.len();
                files.load.settle(len);
                debug!(account = %account, count = len, "file listing loaded");
                Ok(files.files.keys().cloned().collect())
            }
            Err(err) => {
                warn!(account = %account, error = %err, "file listing failed");
                files.load = LoadState::Failed(err.clone());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::StorageClient;
    use crate::mock::{MockNetwork, ops};
    use crate::models::{Address, Identity};
    use crate::SdkError;

    const GATEWAY: &str = "https://gateway.test";

    async fn setup(net: &MockNetwork) -> (FileListing, StorageHandle, AccountId) {
        net.add_account("A1", "Docs", "alice", 1 << 20);
        let client = StorageClient::new(net.connector(), "rpc");
        let handle = client
            .acquire(&Identity::connected(Address::new("alice")))
            .await
            .unwrap();
        (
            FileListing::new(net.probe(), GATEWAY),
            handle,
            AccountId::new("A1"),
        )
    }

    // ========================================================================
    // Listing
    // ========================================================================

    #[tokio::test]
    async fn test_list_keys_loads_names_unresolved() {
        let net = MockNetwork::new();
        let (listing, handle, acct) = setup(&net).await;
        net.put_object("A1", "a.txt", b"hello");
        net.put_object("A1", "b.png", b"png");

        let names = listing.list_keys(&handle, &acct).await.unwrap();

        assert_eq!(names, ["a.txt", "b.png"]);
        let snapshot = listing.snapshot(&acct);
        assert_eq!(snapshot.load, LoadState::Ready);
        assert!(snapshot.files.iter().all(|f| f.size == FileSize::Unresolved));
        assert_eq!(net.calls(ops::PROBE), 0);
    }

    #[tokio::test]
    async fn test_empty_listing_is_not_an_error() {
        let net = MockNetwork::new();
        let (listing, handle, acct) = setup(&net).await;

        assert_eq!(listing.list_keys(&handle, &acct).await, Ok(vec![]));
        assert_eq!(listing.load_state(&acct), LoadState::Empty);
    }

    #[tokio::test]
    async fn test_concurrent_list_keys_issue_one_fetch() {
        let net = MockNetwork::new();
        let (listing, handle, acct) = setup(&net).await;
        net.put_object("A1", "a.txt", b"x");
        let gate = net.hold(ops::LIST_OBJECTS);

        let (a, b, ()) = futures::join!(
            listing.list_keys(&handle, &acct),
            listing.list_keys(&handle, &acct),
            async { gate.release() }
        );

        assert_eq!(a, b);
        assert_eq!(net.calls(ops::LIST_OBJECTS), 1);
    }

    #[tokio::test]
    async fn test_duplicate_keys_are_collapsed() {
        let net = MockNetwork::new();
        let (listing, handle, acct) = setup(&net).await;
        net.put_object("A1", "a.txt", b"x");
        net.list_duplicates(true);

        let names = listing.list_keys(&handle, &acct).await.unwrap();
        assert_eq!(names, ["a.txt"]);
    }

    #[tokio::test]
    async fn test_failed_listing_keeps_previous_names() {
        let net = MockNetwork::new();
        let (listing, handle, acct) = setup(&net).await;
        net.put_object("A1", "a.txt", b"x");
        listing.list_keys(&handle, &acct).await.unwrap();

        net.fail(ops::LIST_OBJECTS, SdkError::Network("offline".into()));
        assert!(listing.reload(&handle, &acct).await.is_err());

        assert_eq!(listing.names(&acct), ["a.txt"]);
        assert!(matches!(listing.load_state(&acct), LoadState::Failed(_)));
    }

    #[tokio::test]
    async fn test_refresh_keeps_resolved_sizes() {
        let net = MockNetwork::new();
        let (listing, handle, acct) = setup(&net).await;
        net.put_object("A1", "a.txt", b"hello");
        listing.list_keys(&handle, &acct).await.unwrap();
        listing.resolve_sizes(&acct).await;

        net.put_object("A1", "b.txt", b"hi");
        listing.reload(&handle, &acct).await.unwrap();

        assert_eq!(listing.file(&acct, "a.txt").unwrap().size, FileSize::Known(5));
        assert_eq!(listing.file(&acct, "b.txt").unwrap().size, FileSize::Unresolved);
    }

    #[tokio::test]
    async fn test_ensure_loaded_skips_loaded_account() {
        let net = MockNetwork::new();
        let (listing, handle, acct) = setup(&net).await;

        listing.ensure_loaded(&handle, &acct).await.unwrap();
        listing.ensure_loaded(&handle, &acct).await.unwrap();

        assert_eq!(net.calls(ops::LIST_OBJECTS), 1);
    }

    #[tokio::test]
    async fn test_forget_discards_pending_fetch() {
        let net = MockNetwork::new();
        let (listing, handle, acct) = setup(&net).await;
        net.put_object("A1", "a.txt", b"x");
        let gate = net.hold(ops::LIST_OBJECTS);

        let (result, ()) = futures::join!(listing.list_keys(&handle, &acct), async {
            listing.forget(&acct);
            gate.release();
        });

        assert_eq!(result, Err(DriveError::Superseded));
        assert_eq!(listing.load_state(&acct), LoadState::Unloaded);
    }

    #[tokio::test]
    async fn test_list_after_forget_does_not_attach_to_stale_fetch() {
        let net = MockNetwork::new();
        let (listing, handle, acct) = setup(&net).await;
        net.put_object("A1", "a.txt", b"x");
        let gate = net.hold(ops::LIST_OBJECTS);

        let (stale, fresh) = futures::join!(listing.list_keys(&handle, &acct), async {
            listing.forget(&acct);
            let fresh = listing.list_keys(&handle, &acct);
            gate.release();
            fresh.await
        });

        assert_eq!(stale, Err(DriveError::Superseded));
        assert_eq!(fresh.unwrap(), ["a.txt"]);
        assert_eq!(listing.load_state(&acct), LoadState::Ready);
        assert!(!listing.snapshot(&acct).loading);
        assert_eq!(net.calls(ops::LIST_OBJECTS), 2);
    }

    // ========================================================================
    // Size probes
    // ========================================================================

    #[tokio::test]
    async fn test_resolve_sizes() {
        let net = MockNetwork::new();
        let (listing, handle, acct) = setup(&net).await;
        net.put_object("A1", "a.txt", b"hello");
        net.put_object("A1", "b.txt", b"hi");
        listing.list_keys(&handle, &acct).await.unwrap();

        listing.resolve_sizes(&acct).await;
        listing.resolve_sizes(&acct).await;

        assert_eq!(listing.file(&acct, "a.txt").unwrap().size, FileSize::Known(5));
        assert_eq!(listing.file(&acct, "b.txt").unwrap().size, FileSize::Known(2));
        assert_eq!(net.calls(ops::PROBE), 2);
    }

    #[tokio::test]
    async fn test_missing_length_is_unknown() {
        let net = MockNetwork::new();
        let (listing, handle, acct) = setup(&net).await;
        net.put_object("A1", "a.txt", b"hello");
        net.omit_length(true);
        listing.list_keys(&handle, &acct).await.unwrap();

        assert_eq!(listing.resolve_size(&acct, "a.txt").await, FileSize::Unknown);
        assert_eq!(listing.names(&acct), ["a.txt"]);
    }

    #[tokio::test]
    async fn test_size_of_name_with_reserved_characters() {
        let net = MockNetwork::new();
        let (listing, handle, acct) = setup(&net).await;
        net.put_object("A1", "a b#1.txt", b"hello");
        listing.list_keys(&handle, &acct).await.unwrap();

        assert_eq!(listing.resolve_size(&acct, "a b#1.txt").await, FileSize::Known(5));
        assert_eq!(
            listing.url(&acct, "a b#1.txt"),
            "https://gateway.test/A1/a%20b%231.txt"
        );
    }

    #[tokio::test]
    async fn test_probe_failure_is_unknown() {
        let net = MockNetwork::new();
        let (listing, handle, acct) = setup(&net).await;
        net.put_object("A1", "a.txt", b"hello");
        net.put_object("A1", "b.txt", b"hi");
        listing.list_keys(&handle, &acct).await.unwrap();
        net.fail(ops::PROBE, SdkError::Network("cors".into()));

        listing.resolve_sizes(&acct).await;

        let snapshot = listing.snapshot(&acct);
        assert_eq!(snapshot.load, LoadState::Ready);
        assert!(snapshot.files.iter().all(|f| f.size == FileSize::Unknown));
    }

    // ========================================================================
    // Projections
    // ========================================================================

    #[tokio::test]
    async fn test_apply_upload_rejects_duplicate() {
        let net = MockNetwork::new();
        let (listing, handle, acct) = setup(&net).await;
        net.put_object("A1", "a.txt", b"x");
        listing.list_keys(&handle, &acct).await.unwrap();

        assert!(!listing.apply_upload(&acct, "a.txt", FileSize::Known(9)));
        assert_eq!(listing.names(&acct).len(), 1);
        assert_eq!(listing.file(&acct, "a.txt").unwrap().size, FileSize::Unresolved);

        assert!(listing.apply_upload(&acct, "b.txt", FileSize::Known(9)));
        assert_eq!(listing.names(&acct), ["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn test_apply_delete_is_idempotent() {
        let net = MockNetwork::new();
        let (listing, handle, acct) = setup(&net).await;
        net.put_object("A1", "a.txt", b"x");
        listing.list_keys(&handle, &acct).await.unwrap();

        assert!(listing.apply_delete(&acct, "a.txt"));
        assert!(!listing.apply_delete(&acct, "a.txt"));
        assert_eq!(listing.load_state(&acct), LoadState::Empty);
    }

    #[tokio::test]
    async fn test_upload_survives_racing_refresh() {
        let net = MockNetwork::new();
        let (listing, handle, acct) = setup(&net).await;
        listing.list_keys(&handle, &acct).await.unwrap();
        let gate = net.hold(ops::LIST_OBJECTS);

        let (names, ()) = futures::join!(listing.reload(&handle, &acct), async {
            listing.apply_upload(&acct, "new.txt", FileSize::Known(3));
            gate.release();
        });

        assert_eq!(names.unwrap(), ["new.txt"]);
        assert_eq!(listing.file(&acct, "new.txt").unwrap().size, FileSize::Known(3));
    }

    #[tokio::test]
    async fn test_table_does_not_refetch() {
        let net = MockNetwork::new();
        let (listing, handle, acct) = setup(&net).await;
        net.put_object("A1", "b.txt", b"x");
        net.put_object("A1", "A.txt", b"x");
        listing.list_keys(&handle, &acct).await.unwrap();

        let rows = listing.table(&acct, &FileQuery::default());
        let tiles = listing.tiles(&acct);

        assert_eq!(rows[0].name, "A.txt");
        assert_eq!(tiles[0].name, "b.txt");
        assert_eq!(net.calls(ops::LIST_OBJECTS), 1);
        assert_eq!(listing.url(&acct, "b.txt"), "https://gateway.test/A1/b.txt");
    }
}
