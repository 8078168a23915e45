//! End-to-end behaviour of a drive session against the in-memory network.

use scoop_core::mock::{MockNetwork, init_test_tracing, ops};
use scoop_core::{
    AccountId, Address, DriveConfig, DriveError, DriveSession, FileQuery, FileSize, Identity,
    LoadState, NoticeKind, SdkError, SortKey, SortOrder, TaskStatus, UploadFile,
};

const ALICE: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";
const BOB: &str = "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T";

fn alice() -> Identity {
    Identity::connected(Address::parse(ALICE).unwrap())
}

fn session(net: &MockNetwork) -> DriveSession {
    init_test_tracing();
    DriveSession::new(
        net.connector(),
        net.probe(),
        DriveConfig::default().with_gateway("https://gateway.test/"),
    )
}

fn account_names(session: &DriveSession) -> Vec<String> {
    session
        .directory()
        .snapshot()
        .accounts
        .into_iter()
        .map(|a| a.display_name)
        .collect()
}

// ============================================================================
// Fetch de-duplication and stale results
// ============================================================================

#[tokio::test]
async fn test_refresh_storm_issues_one_fetch() {
    let net = MockNetwork::new();
    net.add_account("A1", "Docs", ALICE, 1 << 20);
    let session = session(&net);
    session.set_identity(&alice());
    let gate = net.hold(ops::GET_ACCOUNTS);

    let (a, b, c, ()) = futures::join!(
        session.load_directory(),
        session.load_directory(),
        session.load_directory(),
        async { gate.release() }
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(net.calls(ops::GET_ACCOUNTS), 1);
    assert_eq!(net.calls(ops::INIT), 1);
}

#[tokio::test]
async fn test_identity_change_mid_fetch_is_discarded() {
    let net = MockNetwork::new();
    net.add_account("A1", "Alice Docs", ALICE, 1 << 20);
    net.add_account("B1", "Bob Docs", BOB, 1 << 20);
    let session = session(&net);
    session.set_identity(&alice());
    let gate = net.hold(ops::GET_ACCOUNTS);

    let (stale, fresh) = futures::join!(session.load_directory(), async {
        let bob = Identity::connected(Address::parse(BOB).unwrap());
        let fresh = session.switch_identity(&bob);
        gate.release();
        fresh.await
    });

    assert_eq!(stale, Err(DriveError::Superseded));
    assert_eq!(fresh.unwrap().len(), 1);
    assert_eq!(account_names(&session), ["Bob Docs"]);
    // Superseded results are never surfaced
    assert!(session.notifier().current().is_none());
}

// ============================================================================
// Account directory
// ============================================================================

#[tokio::test]
async fn test_zero_accounts_is_empty_state() {
    let net = MockNetwork::new();
    let session = session(&net);

    let result = session.switch_identity(&alice()).await;

    assert_eq!(result, Err(DriveError::Empty));
    assert!(session.directory().snapshot().is_empty_state());
    let notice = session.notifier().current().unwrap();
    assert_eq!(notice.kind, NoticeKind::Info);
}

#[tokio::test]
async fn test_create_docs_drive() {
    let net = MockNetwork::new();
    let session = session(&net);
    let _ = session.switch_identity(&alice()).await;

    let id = session.create_account("Docs", "500MB").await.unwrap();

    let snapshot = session.directory().snapshot();
    assert_eq!(snapshot.accounts.len(), 1);
    assert_eq!(snapshot.load, LoadState::Ready);
    let account = &snapshot.accounts[0];
    assert_eq!(account.id, id);
    assert_eq!(account.display_name, "Docs");
    assert_eq!(account.quota_bytes, 500 * 1024 * 1024);
    assert_eq!(account.used_bytes, 0);
    assert!(!account.immutable);
    assert_eq!(session.notifier().current().unwrap().kind, NoticeKind::Success);
}

#[tokio::test]
async fn test_interleaved_creates_and_deletes_follow_call_order() {
    let net = MockNetwork::new();
    net.add_account("A1", "Old", ALICE, 1 << 20);
    let session = session(&net);
    session.switch_identity(&alice()).await.unwrap();

    // Both creates are in flight at once
    let first = net.hold(ops::CREATE_ACCOUNT);
    let second = net.hold(ops::CREATE_ACCOUNT);
    let (x, y, ()) = futures::join!(
        session.create_account("X", "1MB"),
        session.create_account("Y", "1MB"),
        async {
            second.release();
            first.release();
        }
    );
    let x = x.unwrap();
    y.unwrap();

    // A refresh races the deletion of A1
    let gate = net.hold(ops::GET_ACCOUNTS);
    let (refreshed, deleted) = futures::join!(session.reload_directory(), async {
        let deleted = session.delete_account(&AccountId::new("A1")).await;
        gate.release();
        deleted
    });
    refreshed.unwrap();
    deleted.unwrap();
    session.delete_account(&x).await.unwrap();

    assert_eq!(account_names(&session), ["Y"]);
    assert_eq!(
        session
            .coordinator()
            .tasks()
            .iter()
            .filter(|t| t.status == TaskStatus::Succeeded)
            .count(),
        4
    );
}

#[tokio::test]
async fn test_toggle_on_foreign_account_denied_locally() {
    let net = MockNetwork::new();
    net.add_account("A1", "Mine", ALICE, 1 << 20);
    net.add_account("B1", "Theirs", BOB, 1 << 20);
    let session = session(&net);
    session.switch_identity(&alice()).await.unwrap();
    let foreign = AccountId::new("B1");
    session.select_account(&foreign).await.unwrap();
    let calls = net.total_calls();

    let err = session.toggle_immutable(&foreign).await.unwrap_err();

    assert_eq!(err, DriveError::OwnershipDenied(foreign));
    assert_eq!(net.total_calls(), calls);
    assert_eq!(session.notifier().current().unwrap().kind, NoticeKind::Error);
}

// ============================================================================
// File listing
// ============================================================================

#[tokio::test]
async fn test_failed_upload_leaves_listing_untouched() {
    let net = MockNetwork::new();
    net.add_account("A1", "Docs", ALICE, 1 << 20);
    net.put_object("A1", "a.txt", b"hello");
    let session = session(&net);
    session.switch_identity(&alice()).await.unwrap();
    let id = AccountId::new("A1");
    session.select_account(&id).await.unwrap();
    let before = session.listing().snapshot(&id);

    net.fail(ops::UPLOAD, SdkError::Network("reset by peer".into()));
    let err = session
        .upload_file(&id, UploadFile::new("b.txt", b"data".to_vec()))
        .await
        .unwrap_err();

    assert!(matches!(err, DriveError::Mutation { .. }));
    assert_eq!(session.listing().snapshot(&id), before);
}

#[tokio::test]
async fn test_duplicate_upload_keeps_cardinality() {
    let net = MockNetwork::new();
    net.add_account("A1", "Docs", ALICE, 1 << 20);
    net.put_object("A1", "a.txt", b"hello");
    let session = session(&net);
    session.switch_identity(&alice()).await.unwrap();
    let id = AccountId::new("A1");
    session.select_account(&id).await.unwrap();

    assert!(!session
        .listing()
        .apply_upload(&id, "a.txt", FileSize::Known(1)));
    assert_eq!(session.listing().names(&id).len(), 1);
}

#[tokio::test]
async fn test_remote_delete_failure_keeps_file() {
    let net = MockNetwork::new();
    net.add_account("A1", "Docs", ALICE, 1 << 20);
    net.put_object("A1", "a.txt", b"hello");
    let session = session(&net);
    session.switch_identity(&alice()).await.unwrap();
    let id = AccountId::new("A1");
    session.select_account(&id).await.unwrap();

    net.fail(ops::DELETE_FILE, SdkError::Network("timeout".into()));
    assert!(session.delete_file(&id, "a.txt").await.is_err());

    assert_eq!(session.listing().names(&id), ["a.txt"]);
    let notice = session.notifier().current().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(
        notice.message,
        "delete file failed: network error: timeout"
    );
}

#[tokio::test]
async fn test_missing_content_length_renders_unknown() {
    let net = MockNetwork::new();
    net.add_account("A1", "Docs", ALICE, 1 << 20);
    net.put_object("A1", "a.txt", b"hello");
    net.put_object("A1", "b.pdf", b"%PDF");
    net.omit_length(true);
    let session = session(&net);
    session.switch_identity(&alice()).await.unwrap();
    let id = AccountId::new("A1");

    let names = session.select_account(&id).await.unwrap();
    session.resolve_sizes(&id).await;

    assert_eq!(names, ["a.txt", "b.pdf"]);
    let files = session.listing().tiles(&id);
    assert!(files.iter().all(|f| f.size == FileSize::Unknown));
    assert_eq!(files[1].extension(), Some("pdf"));
}

#[tokio::test]
async fn test_upload_then_sort_by_size() {
    let net = MockNetwork::new();
    net.add_account("A1", "Docs", ALICE, 1 << 20);
    net.put_object("A1", "big.bin", &[0; 64]);
    let session = session(&net);
    session.switch_identity(&alice()).await.unwrap();
    let id = AccountId::new("A1");
    session.select_account(&id).await.unwrap();
    session.resolve_sizes(&id).await;

    let location = session
        .upload_file(&id, UploadFile::new("small.txt", b"ab".to_vec()))
        .await
        .unwrap();

    assert_eq!(location, "https://gateway.test/A1/small.txt");
    assert_eq!(net.objects("A1"), ["big.bin", "small.txt"]);
    let query = FileQuery::new("", SortKey::Size, SortOrder::Ascending);
    let rows = session.listing().table(&id, &query);
    let names: Vec<&str> = rows.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["small.txt", "big.bin"]);
    assert_eq!(net.calls(ops::LIST_OBJECTS), 1);
}
