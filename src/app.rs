//! Root application module.
//!
//! Contains the main App component, the [`AppContext`] bridging the drive
//! session to Leptos signals, and application-level setup logic.

use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use scoop_core::{
    AccountId, DirectorySnapshot, DriveSession, FileEntry, FileQuery, ListingSnapshot, Notice,
    NoticeKind, StorageAccount, UploadFile,
};

use crate::components::Layout;
use crate::config::{APP_NAME, Cluster, DEFAULT_CLUSTER, drive_config};
use crate::core::{GatewayProbe, JsConnector, wallet};
use crate::models::{FileView, WalletState};
use crate::utils::dom;

// ============================================================================
// AppContext
// ============================================================================

/// Application-wide reactive context.
///
/// The [`DriveSession`] owns all drive state; the signals here are snapshots
/// of it, refreshed by [`AppContext::sync`] whenever an operation starts or
/// settles. Components read the signals and call the action methods.
///
/// # Note
///
/// This struct is `Copy` because all fields are Leptos signals or stored
/// values, which are cheap to copy.
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Drive session. Not `Send`, so it lives in local storage.
    session: StoredValue<DriveSession, LocalStorage>,

    /// Wallet connection state.
    pub wallet: RwSignal<WalletState>,

    /// Cluster the storage client talks to.
    pub cluster: RwSignal<Cluster>,

    /// Storage accounts of the connected wallet.
    pub drives: RwSignal<DirectorySnapshot>,

    /// Listing of the selected account.
    pub files: RwSignal<Option<ListingSnapshot>>,

    /// Currently selected account.
    pub selected: RwSignal<Option<AccountId>>,

    /// Metadata of the selected account, owned or inspected.
    pub drive: RwSignal<Option<StorageAccount>>,

    /// Notice shown in the toast.
    pub notice: RwSignal<Option<Notice>>,

    /// Mutations awaiting confirmation.
    pub busy: RwSignal<usize>,

    /// Grid or table layout of the file area.
    pub view: RwSignal<FileView>,

    /// Search and sort applied to the file table.
    pub query: RwSignal<FileQuery>,
}

impl AppContext {
    pub fn new() -> Self {
        let cluster = DEFAULT_CLUSTER;
        let session = DriveSession::new(
            Rc::new(JsConnector),
            Rc::new(GatewayProbe),
            drive_config(cluster),
        );

        let ctx = Self {
            session: StoredValue::new_local(session),
            wallet: RwSignal::new(WalletState::default()),
            cluster: RwSignal::new(cluster),
            drives: RwSignal::new(DirectorySnapshot::default()),
            files: RwSignal::new(None),
            selected: RwSignal::new(None),
            drive: RwSignal::new(None),
            notice: RwSignal::new(None),
            busy: RwSignal::new(0),
            view: RwSignal::new(FileView::default()),
            query: RwSignal::new(FileQuery::default()),
        };
        ctx.watch_notices();
        ctx
    }

    fn session(&self) -> DriveSession {
        self.session.get_value()
    }

    /// Copy the session's current state into the signals.
    pub fn sync(&self) {
        self.session.with_value(|session| {
            let selected = session.selected();
            self.drives.set(session.directory().snapshot());
            self.files
                .set(selected.as_ref().map(|id| session.listing().snapshot(id)));
            self.drive
                .set(selected.as_ref().and_then(|id| session.directory().account(id)));
            self.selected.set(selected);
            self.busy.set(session.coordinator().pending());
        });
    }

    /// Run a session operation in the background.
    ///
    /// The signals are synced once the operation has issued its first
    /// request, so loading flags show, and again when it settles.
    fn run<F, Fut>(&self, op: F)
    where
        F: FnOnce(DriveSession) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let ctx = *self;
        let session = self.session();
        spawn_local(async move {
            futures::join!(op(session), async { ctx.sync() });
            ctx.sync();
        });
    }

    /// Mirror notifier changes and schedule auto-dismissal.
    fn watch_notices(&self) {
        let ctx = *self;
        self.session.with_value(|session| {
            let ttl = session.notifier().ttl();
            session.notifier().subscribe(move |notice| {
                ctx.notice.set(notice.cloned());
                if let Some(notice) = notice.filter(|n| n.kind.auto_dismisses()) {
                    ctx.schedule_dismiss(notice.id, ttl);
                }
            });
        });
    }

    fn schedule_dismiss(&self, id: u64, ttl: Duration) {
        let ctx = *self;
        let millis = u32::try_from(ttl.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, move || ctx.dismiss_notice(id)).forget();
    }

    pub fn dismiss_notice(&self, id: u64) {
        self.session.with_value(|session| {
            session.notifier().dismiss(id);
        });
    }

    fn notify(&self, message: impl Into<String>, kind: NoticeKind) {
        self.session.with_value(|session| {
            session.notifier().publish(message, kind);
        });
    }

    // ------------------------------------------------------------------------
    // Wallet
    // ------------------------------------------------------------------------

    /// Hand the wallet's identity to the session and load its drives.
    fn identity_changed(&self) {
        let identity = self.wallet.with_untracked(|w| w.identity());
        if identity.is_connected() {
            self.run(move |session| async move {
                let _ = session.switch_identity(&identity).await;
            });
        } else {
            self.session.with_value(|session| session.set_identity(&identity));
            self.sync();
        }
    }

    pub fn connect_wallet(&self) {
        let ctx = *self;
        spawn_local(async move {
            if !wallet::is_available() {
                ctx.notify(
                    crate::core::error::WalletError::NotInstalled.to_string(),
                    NoticeKind::Error,
                );
                return;
            }

            ctx.wallet.set(WalletState::Connecting);
            match wallet::connect().await {
                Ok(address) => {
                    wallet::save_session();
                    ctx.set_address(address);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "wallet connection failed");
                    ctx.wallet.set(WalletState::Disconnected);
                    ctx.notify(format!("Connection failed: {}", e), NoticeKind::Error);
                }
            }
        });
    }

    pub fn disconnect_wallet(&self) {
        wallet::clear_session();
        spawn_local(wallet::disconnect());
        self.wallet.set(WalletState::Disconnected);
        self.identity_changed();
    }

    /// Reconnect silently if the user logged in before.
    pub fn restore_wallet(&self) {
        if !(wallet::is_available() && wallet::has_session()) {
            return;
        }
        let ctx = *self;
        spawn_local(async move {
            match wallet::get_account().await {
                Some(address) => ctx.set_address(address),
                None => wallet::clear_session(),
            }
        });
    }

    fn set_address(&self, address: String) {
        match scoop_core::Address::parse(&address) {
            Ok(address) => {
                tracing::info!(address = %address, "wallet connected");
                self.wallet.set(WalletState::Connected { address });
            }
            Err(e) => {
                self.wallet.set(WalletState::Disconnected);
                self.notify(e.to_string(), NoticeKind::Error);
            }
        }
        self.identity_changed();
    }

    /// Follow account switches and disconnects made in the wallet.
    pub fn watch_wallet(&self) {
        let ctx = *self;
        let _ = wallet::on_account_changed(move |account| match account {
            Some(address) => ctx.set_address(address),
            None => {
                wallet::clear_session();
                ctx.wallet.set(WalletState::Disconnected);
                ctx.identity_changed();
            }
        });

        let ctx = *self;
        let _ = wallet::on_disconnect(move || {
            ctx.wallet.set(WalletState::Disconnected);
            ctx.identity_changed();
        });
    }

    // ------------------------------------------------------------------------
    // Drives
    // ------------------------------------------------------------------------

    pub fn set_cluster(&self, cluster: Cluster) {
        self.cluster.set(cluster);
        let changed = self
            .session
            .with_value(|session| session.set_endpoint(cluster.endpoint()));
        if changed {
            self.run(|session| async move {
                let _ = session.load_directory().await;
            });
        }
    }

    pub fn refresh_drives(&self) {
        self.run(|session| async move {
            let _ = session.reload_directory().await;
        });
    }

    pub fn open_drive(&self, id: AccountId) {
        self.query.set(FileQuery::default());
        let ctx = *self;
        self.run(move |session| async move {
            if session.select_account(&id).await.is_ok() {
                ctx.resolve_sizes(id);
            }
        });
    }

    /// Probe file sizes in a task of their own, after the names have been
    /// synced.
    fn resolve_sizes(&self, id: AccountId) {
        self.run(move |session| async move {
            session.resolve_sizes(&id).await;
        });
    }

    pub fn close_drive(&self) {
        self.session.with_value(|session| session.clear_selection());
        self.sync();
    }

    pub fn refresh_files(&self) {
        let ctx = *self;
        self.run(move |session| async move {
            if session.refresh_files().await.is_ok() {
                if let Some(id) = session.selected() {
                    ctx.resolve_sizes(id);
                }
            }
        });
    }

    pub fn create_drive(&self, name: String, size: String) {
        self.run(move |session| async move {
            let _ = session.create_account(&name, &size).await;
        });
    }

    pub fn delete_drive(&self, id: AccountId) {
        self.run(move |session| async move {
            let _ = session.delete_account(&id).await;
        });
    }

    pub fn make_immutable(&self, id: AccountId) {
        self.run(move |session| async move {
            let _ = session.toggle_immutable(&id).await;
        });
    }

    // ------------------------------------------------------------------------
    // Files
    // ------------------------------------------------------------------------

    /// Read a picked file and upload it to `id`.
    pub fn upload(&self, id: AccountId, file: web_sys::File) {
        let ctx = *self;
        self.run(move |session| async move {
            let bytes = match dom::read_file(&file).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    ctx.notify(format!("Could not read {}: {}", file.name(), e), NoticeKind::Error);
                    return;
                }
            };
            let _ = session
                .upload_file(&id, UploadFile::new(file.name(), bytes))
                .await;
        });
    }

    pub fn delete_file(&self, id: AccountId, name: String) {
        self.run(move |session| async move {
            let _ = session.delete_file(&id, &name).await;
        });
    }

    /// Copy a file's gateway URL to the clipboard.
    pub fn copy_link(&self, id: &AccountId, name: &str) {
        let ctx = *self;
        let url = self.file_url(id, name);
        spawn_local(async move {
            match dom::copy_text(&url).await {
                Ok(()) => ctx.notify("Link copied to clipboard", NoticeKind::Success),
                Err(e) => {
                    tracing::warn!(error = %e, "clipboard write failed");
                    ctx.notify("Failed to copy link", NoticeKind::Error);
                }
            }
        });
    }

    /// Gateway URL of a file.
    pub fn file_url(&self, id: &AccountId, name: &str) -> String {
        self.session
            .with_value(|session| session.listing().url(id, name))
    }

    /// Apply the current search and sort to the selected listing.
    pub fn table_rows(&self) -> Vec<FileEntry> {
        let query = self.query.get();
        self.files.with(|files| {
            files
                .as_ref()
                .map(|listing| query.apply(listing.files.iter().cloned()))
                .unwrap_or_default()
        })
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Root application component with error boundary.
///
/// This component:
/// - Creates and provides the global AppContext
/// - Restores the wallet session and subscribes to wallet events
/// - Wraps the app in an ErrorBoundary for graceful error handling
#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext::new();
    provide_context(ctx);

    dom::set_title(APP_NAME);
    ctx.watch_wallet();
    ctx.restore_wallet();

    view! {
        <ErrorBoundary
            fallback=|errors| view! {
                <div style="
                    display: flex;
                    flex-direction: column;
                    align-items: center;
                    justify-content: center;
                    height: 100vh;
                    padding: 2rem;
                    background: #0b0d17;
                    color: #e6e6f0;
                    font-family: 'Inter', system-ui, sans-serif;
                ">
                    <div style="
                        max-width: 600px;
                        text-align: center;
                    ">
                        <h1 style="color: #ff6b6b; margin-bottom: 1rem;">
                            "Something went wrong"
                        </h1>
                        <p style="color: #a0a0b0; margin-bottom: 2rem;">
                            "An unexpected error occurred. Please try reloading the page."
                        </p>
                        <details style="
                            text-align: left;
                            background: #161a2e;
                            padding: 1rem;
                            border-radius: 8px;
                            margin-bottom: 1rem;
                        ">
                            <summary style="cursor: pointer; color: #7a7f99;">
                                "Error details"
                            </summary>
                            <ul style="
                                margin: 1rem 0 0 0;
                                padding-left: 1.5rem;
                                color: #ff6b6b;
                                font-size: 0.9rem;
                            ">
                                {move || errors.get()
                                    .into_iter()
                                    .map(|(_, e)| view! { <li>{e.to_string()}</li> })
                                    .collect::<Vec<_>>()
                                }
                            </ul>
                        </details>
                        <button
                            on:click=move |_| {
                                if let Some(window) = web_sys::window() {
                                    let _ = window.location().reload();
                                }
                            }
                            style="
                                background: #9945ff;
                                color: white;
                                border: none;
                                padding: 0.75rem 2rem;
                                border-radius: 8px;
                                cursor: pointer;
                                font-size: 1rem;
                            "
                        >
                            "Reload Page"
                        </button>
                    </div>
                </div>
            }
        >
            <Layout />
        </ErrorBoundary>
    }
}
