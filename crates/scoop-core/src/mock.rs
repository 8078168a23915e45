//! In-memory storage network for tests.
//!
//! [`MockNetwork`] holds accounts and objects and hands out SDK instances
//! bound to an owner. Every call is counted per operation, can be made to
//! fail, and can be held at its await point with [`MockNetwork::hold`] so a
//! test decides exactly when a response arrives.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use indexmap::IndexMap;
use percent_encoding::percent_decode_str;

use crate::error::SdkError;
use crate::models::{AccountId, Address, SizeSpec, UploadFile, object_url};
use crate::sdk::{
    AccountInfo, CreatedAccount, SdkConnector, Signature, SizeProbe, StorageSdk, UploadReceipt,
};

/// Install a test subscriber honouring `RUST_LOG` (default `debug`).
///
/// Safe to call from every test; only the first call installs it.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Gateway the mock reports upload locations on.
pub const MOCK_GATEWAY: &str = "https://gateway.test";

/// Operation names for [`MockNetwork::calls`], [`MockNetwork::fail`] and
/// [`MockNetwork::hold`].
pub mod ops {
    pub const CONNECT: &str = "connect";
    pub const INIT: &str = "init";
    pub const GET_ACCOUNTS: &str = "get_storage_accounts";
    pub const GET_ACCOUNT: &str = "get_storage_account";
    pub const CREATE_ACCOUNT: &str = "create_storage_account";
    pub const DELETE_ACCOUNT: &str = "delete_storage_account";
    pub const MAKE_IMMUTABLE: &str = "make_storage_immutable";
    pub const UPLOAD: &str = "upload_file";
    pub const DELETE_FILE: &str = "delete_file";
    pub const LIST_OBJECTS: &str = "list_objects";
    pub const PROBE: &str = "content_length";
}

#[derive(Default)]
struct MockState {
    accounts: IndexMap<AccountId, AccountInfo>,
    objects: IndexMap<AccountId, IndexMap<String, Vec<u8>>>,
    calls: HashMap<&'static str, usize>,
    failures: HashMap<&'static str, SdkError>,
    gates: HashMap<&'static str, VecDeque<oneshot::Receiver<()>>>,
    created: u64,
    omit_length: bool,
    list_duplicates: bool,
}

/// Releases one held call. Dropping the gate releases it too.
pub struct Gate(oneshot::Sender<()>);

impl Gate {
    pub fn release(self) {
        let _ = self.0.send(());
    }
}

#[derive(Clone, Default)]
pub struct MockNetwork {
    state: Rc<RefCell<MockState>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&self, id: &str, name: &str, owner: &str, quota_bytes: u64) {
        let mut state = self.state.borrow_mut();
        let id = AccountId::new(id);
        state.accounts.insert(
            id.clone(),
            AccountInfo {
                identifier: name.to_string(),
                owner: Address::new(owner),
                reserved_bytes: quota_bytes,
                current_usage: 0,
                immutable: false,
            },
        );
        state.objects.entry(id).or_default();
    }

    pub fn account(&self, id: &str) -> Option<AccountInfo> {
        self.state.borrow().accounts.get(&AccountId::new(id)).cloned()
    }

    pub fn put_object(&self, account: &str, name: &str, bytes: &[u8]) {
        let mut state = self.state.borrow_mut();
        state
            .objects
            .entry(AccountId::new(account))
            .or_default()
            .insert(name.to_string(), bytes.to_vec());
    }

    pub fn objects(&self, account: &str) -> Vec<String> {
        self.state
            .borrow()
            .objects
            .get(&AccountId::new(account))
            .map(|o| o.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Make every later `op` call fail with `err` until [`recover`](Self::recover).
    pub fn fail(&self, op: &'static str, err: SdkError) {
        self.state.borrow_mut().failures.insert(op, err);
    }

    pub fn recover(&self, op: &'static str) {
        self.state.borrow_mut().failures.remove(op);
    }

    /// Hold the next `op` call until the returned gate is released.
    pub fn hold(&self, op: &'static str) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.state
            .borrow_mut()
            .gates
            .entry(op)
            .or_default()
            .push_back(rx);
        Gate(tx)
    }

    pub fn calls(&self, op: &'static str) -> usize {
        self.state.borrow().calls.get(op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state.borrow().calls.values().sum()
    }

    /// Answer size probes without a content length.
    pub fn omit_length(&self, omit: bool) {
        self.state.borrow_mut().omit_length = omit;
    }

    /// List every object key twice.
    pub fn list_duplicates(&self, duplicate: bool) {
        self.state.borrow_mut().list_duplicates = duplicate;
    }

    pub fn connector(&self) -> Rc<dyn SdkConnector> {
        Rc::new(self.clone())
    }

    pub fn probe(&self) -> Rc<dyn SizeProbe> {
        Rc::new(MockProbe {
            network: self.clone(),
        })
    }

    fn count(&self, op: &'static str) {
        *self.state.borrow_mut().calls.entry(op).or_default() += 1;
    }

    /// Count the call, wait on its gate if any, then apply injected failures.
    async fn enter(&self, op: &'static str) -> Result<(), SdkError> {
        self.count(op);
        let gate = self
            .state
            .borrow_mut()
            .gates
            .get_mut(op)
            .and_then(VecDeque::pop_front);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        match self.state.borrow().failures.get(op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl SdkConnector for MockNetwork {
    fn connect(&self, owner: &Address, _endpoint: &str) -> Rc<dyn StorageSdk> {
        self.count(ops::CONNECT);
        Rc::new(MockSdk {
            network: self.clone(),
            owner: owner.clone(),
        })
    }
}

/// SDK instance acting for one owner.
pub struct MockSdk {
    network: MockNetwork,
    owner: Address,
}

impl MockSdk {
    fn signature(&self, op: &str, id: &AccountId) -> Signature {
        Signature::new(format!("{}:{}", op, id))
    }

    /// Ensure `id` exists and belongs to this SDK's owner.
    fn check_owned(&self, state: &MockState, id: &AccountId) -> Result<(), SdkError> {
        match state.accounts.get(id) {
            None => Err(SdkError::NotFound(id.to_string())),
            Some(info) if info.owner != self.owner => {
                Err(SdkError::Rejected(format!("{} is not owned by signer", id)))
            }
            Some(_) => Ok(()),
        }
    }
}

#[async_trait(?Send)]
impl StorageSdk for MockSdk {
    async fn init(&self) -> Result<(), SdkError> {
        self.network.enter(ops::INIT).await
    }

    async fn get_storage_accounts(&self) -> Result<Vec<AccountId>, SdkError> {
        self.network.enter(ops::GET_ACCOUNTS).await?;
        let state = self.network.state.borrow();
        Ok(state
            .accounts
            .iter()
            .filter(|(_, info)| info.owner == self.owner)
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn get_storage_account(&self, id: &AccountId) -> Result<AccountInfo, SdkError> {
        self.network.enter(ops::GET_ACCOUNT).await?;
        self.network
            .state
            .borrow()
            .accounts
            .get(id)
            .cloned()
            .ok_or_else(|| SdkError::NotFound(id.to_string()))
    }

    async fn create_storage_account(
        &self,
        name: &str,
        size: &SizeSpec,
    ) -> Result<CreatedAccount, SdkError> {
        self.network.enter(ops::CREATE_ACCOUNT).await?;
        let mut state = self.network.state.borrow_mut();
        state.created += 1;
        let id = AccountId::new(format!("New{}", state.created));
        state.accounts.insert(
            id.clone(),
            AccountInfo {
                identifier: name.to_string(),
                owner: self.owner.clone(),
                reserved_bytes: size.bytes(),
                current_usage: 0,
                immutable: false,
            },
        );
        state.objects.insert(id.clone(), IndexMap::new());
        Ok(CreatedAccount {
            transaction_signature: self.signature("create", &id),
            shdw_bucket: id,
        })
    }

    async fn delete_storage_account(&self, id: &AccountId) -> Result<Signature, SdkError> {
        self.network.enter(ops::DELETE_ACCOUNT).await?;
        let mut state = self.network.state.borrow_mut();
        self.check_owned(&state, id)?;
        state.accounts.shift_remove(id);
        state.objects.shift_remove(id);
        Ok(self.signature("delete", id))
    }

    async fn make_storage_immutable(&self, id: &AccountId) -> Result<Signature, SdkError> {
        self.network.enter(ops::MAKE_IMMUTABLE).await?;
        let mut state = self.network.state.borrow_mut();
        self.check_owned(&state, id)?;
        if let Some(info) = state.accounts.get_mut(id) {
            info.immutable = true;
        }
        Ok(self.signature("immutable", id))
    }

    async fn upload_file(
        &self,
        id: &AccountId,
        file: &UploadFile,
    ) -> Result<UploadReceipt, SdkError> {
        self.network.enter(ops::UPLOAD).await?;
        let mut state = self.network.state.borrow_mut();
        self.check_owned(&state, id)?;
        let objects = state.objects.entry(id.clone()).or_default();
        if objects.contains_key(&file.name) {
            return Err(SdkError::Rejected(format!("{} already exists", file.name)));
        }
        objects.insert(file.name.clone(), file.bytes.clone());
        if let Some(info) = state.accounts.get_mut(id) {
            info.current_usage += file.len();
        }
        Ok(UploadReceipt {
            finalized_locations: vec![object_url(MOCK_GATEWAY, id, &file.name)],
            message: String::new(),
        })
    }

    async fn delete_file(&self, id: &AccountId, url: &str) -> Result<Signature, SdkError> {
        self.network.enter(ops::DELETE_FILE).await?;
        let mut state = self.network.state.borrow_mut();
        self.check_owned(&state, id)?;
        let name = object_name(url.rsplit('/').next().unwrap_or(url));
        state
            .objects
            .get_mut(id)
            .and_then(|objects| objects.shift_remove(name.as_str()))
            .ok_or_else(|| SdkError::NotFound(url.to_string()))?;
        Ok(self.signature("delete-file", id))
    }

    async fn list_objects(&self, id: &AccountId) -> Result<Vec<String>, SdkError> {
        self.network.enter(ops::LIST_OBJECTS).await?;
        let state = self.network.state.borrow();
        let names: Vec<String> = state
            .objects
            .get(id)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default();
        if state.list_duplicates {
            Ok(names.iter().flat_map(|n| [n.clone(), n.clone()]).collect())
        } else {
            Ok(names)
        }
    }
}

/// Object key from the last segment of an object URL.
fn object_name(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

/// Size probe reading object lengths from the network's store.
pub struct MockProbe {
    network: MockNetwork,
}

#[async_trait(?Send)]
impl SizeProbe for MockProbe {
    async fn content_length(&self, url: &str) -> Result<Option<u64>, SdkError> {
        self.network.enter(ops::PROBE).await?;
        let state = self.network.state.borrow();
        if state.omit_length {
            return Ok(None);
        }
        let mut parts = url.rsplitn(3, '/');
        let (Some(name), Some(account)) = (parts.next(), parts.next()) else {
            return Err(SdkError::InvalidResponse(url.to_string()));
        };
        state
            .objects
            .get(&AccountId::new(account))
            .and_then(|objects| objects.get(object_name(name).as_str()))
            .map(|bytes| Some(bytes.len() as u64))
            .ok_or_else(|| SdkError::NotFound(url.to_string()))
    }
}
