//! Session wiring.
//!
//! [`DriveSession`] owns one instance of each orchestrator component and
//! drives them from the two external transitions the core reacts to:
//! identity changes and account selection. Read failures are reported to
//! the notifier here; mutations report their own outcomes.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info};

use crate::client::StorageClient;
use crate::config::DriveConfig;
use crate::coordinator::MutationCoordinator;
use crate::directory::AccountDirectory;
use crate::error::DriveError;
use crate::listing::FileListing;
use crate::models::{AccountId, Identity, StorageAccount, UploadFile};
use crate::notify::{NoticeKind, Notifier};
use crate::sdk::{SdkConnector, Signature, SizeProbe};

#[derive(Clone)]
pub struct DriveSession {
    config: Rc<DriveConfig>,
    client: StorageClient,
    directory: AccountDirectory,
    listing: FileListing,
    notifier: Notifier,
    coordinator: MutationCoordinator,
    selected: Rc<RefCell<Option<AccountId>>>,
}

impl DriveSession {
    pub fn new(
        connector: Rc<dyn SdkConnector>,
        probe: Rc<dyn SizeProbe>,
        config: DriveConfig,
    ) -> Self {
        let client = StorageClient::new(connector, config.endpoint.clone());
        let directory = AccountDirectory::new();
        let listing = FileListing::new(probe, config.gateway.clone());
        let notifier = Notifier::new(config.notice_ttl);
        let coordinator = MutationCoordinator::new(
            client.clone(),
            directory.clone(),
            listing.clone(),
            notifier.clone(),
            config.task_history,
        );
        Self {
            config: Rc::new(config),
            client,
            directory,
            listing,
            notifier,
            coordinator,
            selected: Rc::new(RefCell::new(None)),
        }
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    pub fn client(&self) -> &StorageClient {
        &self.client
    }

    pub fn directory(&self) -> &AccountDirectory {
        &self.directory
    }

    pub fn listing(&self) -> &FileListing {
        &self.listing
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn coordinator(&self) -> &MutationCoordinator {
        &self.coordinator
    }

    pub fn identity(&self) -> Identity {
        self.client.identity()
    }

    // ========================================================================
    // Identity
    // ========================================================================

    /// Bind to a new identity. Caches and selection are dropped when the
    /// active address changed. Returns whether it did.
    pub fn set_identity(&self, identity: &Identity) -> bool {
        let changed = self.client.bind(identity);
        if changed {
            info!(
                connected = identity.is_connected(),
                "identity changed, resetting caches"
            );
            self.reset();
        }
        changed
    }

    /// [`set_identity`](Self::set_identity), then load the directory if the
    /// new identity is connected.
    pub async fn switch_identity(
        &self,
        identity: &Identity,
    ) -> Result<Vec<StorageAccount>, DriveError> {
        self.set_identity(identity);
        if !identity.is_connected() {
            return Err(DriveError::NotConnected);
        }
        self.load_directory().await
    }

    /// Point the storage client at another RPC endpoint.
    pub fn set_endpoint(&self, endpoint: impl Into<String>) -> bool {
        let changed = self.client.set_endpoint(endpoint);
        if changed {
            self.reset();
        }
        changed
    }

    fn reset(&self) {
        self.directory.reset();
        self.listing.reset();
        *self.selected.borrow_mut() = None;
    }

    // ========================================================================
    // Directory
    // ========================================================================

    /// Load the owned accounts unless already loaded.
    pub async fn load_directory(&self) -> Result<Vec<StorageAccount>, DriveError> {
        let result = async {
            let handle = self.client.handle().await?;
            self.directory.ensure_loaded(&handle).await
        }
        .await;
        self.report(result)
    }

    /// Refetch the owned accounts.
    pub async fn reload_directory(&self) -> Result<Vec<StorageAccount>, DriveError> {
        let result = async {
            let handle = self.client.handle().await?;
            self.directory.reload(&handle).await
        }
        .await;
        self.report(result)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn selected(&self) -> Option<AccountId> {
        self.selected.borrow().clone()
    }

    pub fn clear_selection(&self) {
        *self.selected.borrow_mut() = None;
    }

    /// Select an account and load its file names.
    ///
    /// Accounts missing from the directory are inspected first so their
    /// owner is known to the coordinator. Sizes stay unresolved until
    /// [`DriveSession::resolve_sizes`] runs, so the names can be shown first.
    pub async fn select_account(&self, id: &AccountId) -> Result<Vec<String>, DriveError> {
        *self.selected.borrow_mut() = Some(id.clone());
        debug!(account = %id, "account selected");

        let result = async {
            let handle = self.client.handle().await?;
            if self.directory.account(id).is_none() {
                self.directory.inspect(&handle, id).await?;
            }
            self.listing.ensure_loaded(&handle, id).await
        }
        .await;
        self.report(result)
    }

    /// Probe the unresolved file sizes of `id`, unless another account has
    /// been selected meanwhile.
    pub async fn resolve_sizes(&self, id: &AccountId) {
        if self.selected().as_ref() == Some(id) {
            self.listing.resolve_sizes(id).await;
        }
    }

    /// Refetch the selected account's file names.
    pub async fn refresh_files(&self) -> Result<Vec<String>, DriveError> {
        let Some(id) = self.selected() else {
            return Ok(Vec::new());
        };
        let result = async {
            let handle = self.client.handle().await?;
            self.listing.reload(&handle, &id).await
        }
        .await;
        self.report(result)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    pub async fn create_account(&self, name: &str, size: &str) -> Result<AccountId, DriveError> {
        self.coordinator.create_account(name, size).await
    }

    pub async fn delete_account(&self, id: &AccountId) -> Result<Signature, DriveError> {
        let signature = self.coordinator.delete_account(id).await?;
        if self.selected().as_ref() == Some(id) {
            self.clear_selection();
        }
        Ok(signature)
    }

    pub async fn toggle_immutable(&self, id: &AccountId) -> Result<Signature, DriveError> {
        self.coordinator.toggle_immutable(id).await
    }

    pub async fn upload_file(&self, id: &AccountId, file: UploadFile) -> Result<String, DriveError> {
        self.coordinator.upload_file(id, file).await
    }

    pub async fn delete_file(&self, id: &AccountId, name: &str) -> Result<Signature, DriveError> {
        self.coordinator.delete_file(id, name).await
    }

    /// Publish a read result. Empty is informational; superseded results
    /// are dropped silently.
    fn report<T>(&self, result: Result<T, DriveError>) -> Result<T, DriveError> {
        match &result {
            Ok(_) | Err(DriveError::Superseded) => {}
            Err(DriveError::Empty) => {
                self.notifier
                    .publish(DriveError::Empty.to_string(), NoticeKind::Info);
            }
            Err(err) => {
                self.notifier.publish(err.to_string(), NoticeKind::Error);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockNetwork, ops};
    use crate::models::{Address, FileSize};

    fn session(net: &MockNetwork) -> DriveSession {
        DriveSession::new(
            net.connector(),
            net.probe(),
            DriveConfig::default().with_gateway("https://gateway.test"),
        )
    }

    fn alice() -> Identity {
        Identity::connected(Address::new("alice"))
    }

    #[tokio::test]
    async fn test_switch_identity_loads_directory() {
        let net = MockNetwork::new();
        net.add_account("A1", "Docs", "alice", 1 << 20);
        let session = session(&net);

        let accounts = session.switch_identity(&alice()).await.unwrap();

        assert_eq!(accounts.len(), 1);
        assert!(session.notifier().current().is_none());
    }

    #[tokio::test]
    async fn test_empty_directory_publishes_info() {
        let net = MockNetwork::new();
        let session = session(&net);

        assert_eq!(session.switch_identity(&alice()).await, Err(DriveError::Empty));

        let notice = session.notifier().current().unwrap();
        assert_eq!(notice.kind, NoticeKind::Info);
        assert!(notice.message.contains("get started"));
    }

    #[tokio::test]
    async fn test_disconnect_resets_caches() {
        let net = MockNetwork::new();
        net.add_account("A1", "Docs", "alice", 1 << 20);
        let session = session(&net);
        session.switch_identity(&alice()).await.unwrap();
        session.select_account(&AccountId::new("A1")).await.unwrap();

        assert!(session.set_identity(&Identity::disconnected()));

        assert!(session.directory().is_empty());
        assert_eq!(session.selected(), None);
        assert!(!session.set_identity(&Identity::disconnected()));
    }

    #[tokio::test]
    async fn test_select_account_lists_names_before_sizes() {
        let net = MockNetwork::new();
        net.add_account("A1", "Docs", "alice", 1 << 20);
        net.put_object("A1", "a.txt", b"hello");
        let session = session(&net);
        session.switch_identity(&alice()).await.unwrap();
        let id = AccountId::new("A1");
        let gate = net.hold(ops::PROBE);

        let names = session.select_account(&id).await.unwrap();

        assert_eq!(names, ["a.txt"]);
        let snapshot = session.listing().snapshot(&id);
        assert_eq!(snapshot.files[0].size, FileSize::Unresolved);
        assert!(!snapshot.loading);
        assert_eq!(net.calls(ops::PROBE), 0);

        let ((), ()) = futures::join!(session.resolve_sizes(&id), async { gate.release() });
        assert_eq!(
            session.listing().file(&id, "a.txt").unwrap().size,
            FileSize::Known(5)
        );
    }

    #[tokio::test]
    async fn test_resolve_sizes_skips_deselected_account() {
        let net = MockNetwork::new();
        net.add_account("A1", "Docs", "alice", 1 << 20);
        net.put_object("A1", "a.txt", b"hello");
        let session = session(&net);
        session.switch_identity(&alice()).await.unwrap();
        let id = AccountId::new("A1");
        session.select_account(&id).await.unwrap();

        session.clear_selection();
        session.resolve_sizes(&id).await;

        assert_eq!(net.calls(ops::PROBE), 0);
        assert_eq!(
            session.listing().file(&id, "a.txt").unwrap().size,
            FileSize::Unresolved
        );
    }

    #[tokio::test]
    async fn test_select_foreign_account_inspects_it() {
        let net = MockNetwork::new();
        net.add_account("A1", "Docs", "alice", 1 << 20);
        net.add_account("B1", "Theirs", "bob", 1 << 20);
        let session = session(&net);
        session.switch_identity(&alice()).await.unwrap();
        let id = AccountId::new("B1");

        session.select_account(&id).await.unwrap();

        assert!(session.directory().account(&id).is_some());
        let err = session.delete_file(&id, "x").await.unwrap_err();
        assert_eq!(err, DriveError::OwnershipDenied(id));
    }

    #[tokio::test]
    async fn test_fetch_error_publishes_error() {
        let net = MockNetwork::new();
        net.fail(ops::GET_ACCOUNTS, crate::SdkError::Network("down".into()));
        let session = session(&net);

        let err = session.switch_identity(&alice()).await.unwrap_err();

        assert!(matches!(err, DriveError::Fetch { .. }));
        assert_eq!(session.notifier().current().unwrap().kind, NoticeKind::Error);
    }

    #[tokio::test]
    async fn test_delete_selected_account_clears_selection() {
        let net = MockNetwork::new();
        net.add_account("A1", "Docs", "alice", 1 << 20);
        let session = session(&net);
        session.switch_identity(&alice()).await.unwrap();
        let id = AccountId::new("A1");
        session.select_account(&id).await.unwrap();

        session.delete_account(&id).await.unwrap();

        assert_eq!(session.selected(), None);
    }
}
