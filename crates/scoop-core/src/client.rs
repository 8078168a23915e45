//! Storage client handle management.
//!
//! A [`StorageHandle`] wraps an initialized SDK instance for one identity.
//! [`StorageClient`] hands out the current handle, building it at most once
//! per identity/endpoint binding: concurrent acquisitions share a single
//! `init()` round trip, and any change of identity or endpoint discards the
//! handle so nothing keeps mutating through a stale wallet.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::error::DriveError;
use crate::inflight::InFlight;
use crate::models::{Address, Identity};
use crate::sdk::{SdkConnector, StorageSdk};

/// An initialized SDK bound to one identity.
///
/// Cheap to clone; all clones share the same SDK instance.
#[derive(Clone)]
pub struct StorageHandle {
    sdk: Rc<dyn StorageSdk>,
    owner: Address,
    epoch: u64,
}

impl StorageHandle {
    pub fn sdk(&self) -> &dyn StorageSdk {
        self.sdk.as_ref()
    }

    /// Identity this handle acts for.
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Binding generation the handle was built in.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl fmt::Debug for StorageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageHandle")
            .field("owner", &self.owner)
            .field("epoch", &self.epoch)
            .finish()
    }
}

struct ClientState {
    identity: Identity,
    endpoint: String,
    /// Bumped whenever identity or endpoint changes.
    epoch: u64,
    current: Option<StorageHandle>,
}

/// Source of the current [`StorageHandle`].
#[derive(Clone)]
pub struct StorageClient {
    connector: Rc<dyn SdkConnector>,
    state: Rc<RefCell<ClientState>>,
    building: InFlight<u64, StorageHandle>,
}

impl StorageClient {
    pub fn new(connector: Rc<dyn SdkConnector>, endpoint: impl Into<String>) -> Self {
        Self {
            connector,
            state: Rc::new(RefCell::new(ClientState {
                identity: Identity::disconnected(),
                endpoint: endpoint.into(),
                epoch: 0,
                current: None,
            })),
            building: InFlight::new(),
        }
    }

    /// Identity the client is currently bound to.
    pub fn identity(&self) -> Identity {
        self.state.borrow().identity.clone()
    }

    pub fn endpoint(&self) -> String {
        self.state.borrow().endpoint.clone()
    }

    /// Bind to `identity`. Returns `true` when the active address changed,
    /// in which case the current handle has been discarded.
    pub fn bind(&self, identity: &Identity) -> bool {
        let mut state = self.state.borrow_mut();
        let changed = state.identity.active() != identity.active();
        state.identity = identity.clone();
        if changed {
            state.epoch += 1;
            state.current = None;
            debug!(
                address = ?identity.active().map(Address::as_str),
                epoch = state.epoch,
                "storage client rebound"
            );
        }
        changed
    }

    /// Point the client at another RPC endpoint. Returns `true` on change.
    pub fn set_endpoint(&self, endpoint: impl Into<String>) -> bool {
        let endpoint = endpoint.into();
        let mut state = self.state.borrow_mut();
        if state.endpoint == endpoint {
            return false;
        }
        state.endpoint = endpoint;
        state.epoch += 1;
        state.current = None;
        debug!(endpoint = %state.endpoint, "storage client endpoint changed");
        true
    }

    /// True while `handle` belongs to the current binding.
    pub fn is_current(&self, handle: &StorageHandle) -> bool {
        self.state.borrow().epoch == handle.epoch
    }

    /// Bind to `identity` and return its handle.
    pub async fn acquire(&self, identity: &Identity) -> Result<StorageHandle, DriveError> {
        self.bind(identity);
        self.handle().await
    }

    /// Handle for the bound identity, built on first use.
    pub async fn handle(&self) -> Result<StorageHandle, DriveError> {
        let (owner, endpoint, epoch) = {
            let state = self.state.borrow();
            let Some(owner) = state.identity.active().cloned() else {
                return Err(DriveError::NotConnected);
            };
            if let Some(current) = &state.current {
                return Ok(current.clone());
            }
            (owner, state.endpoint.clone(), state.epoch)
        };

        let build = self.building.join_or_start(epoch, || {
            let connector = Rc::clone(&self.connector);
            let state = Rc::clone(&self.state);
            async move {
                let sdk = connector.connect(&owner, &endpoint);
                sdk.init()
                    .await
                    .map_err(|e| DriveError::fetch("storage client", e))?;

                let handle = StorageHandle { sdk, owner, epoch };
                let mut state = state.borrow_mut();
                if state.epoch != epoch {
                    debug!(epoch, "dropping storage handle built for a stale identity");
                    return Err(DriveError::Superseded);
                }
                state.current = Some(handle.clone());
                Ok(handle)
            }
        });
        build.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockNetwork, ops};

    fn identity(addr: &str) -> Identity {
        Identity::connected(Address::new(addr))
    }

    #[tokio::test]
    async fn test_acquire_requires_connection() {
        let net = MockNetwork::new();
        let client = StorageClient::new(net.connector(), "rpc");

        assert_eq!(
            client.acquire(&Identity::disconnected()).await.unwrap_err(),
            DriveError::NotConnected
        );
        let retained = Identity {
            address: Some(Address::new("alice")),
            connected: false,
        };
        assert_eq!(
            client.acquire(&retained).await.unwrap_err(),
            DriveError::NotConnected
        );
        assert_eq!(net.calls(ops::INIT), 0);
    }

    #[tokio::test]
    async fn test_acquire_is_idempotent_per_identity() {
        let net = MockNetwork::new();
        let client = StorageClient::new(net.connector(), "rpc");
        let alice = identity("alice");

        let first = client.acquire(&alice).await.unwrap();
        let second = client.acquire(&alice).await.unwrap();

        assert_eq!(first.epoch(), second.epoch());
        assert_eq!(net.calls(ops::CONNECT), 1);
        assert_eq!(net.calls(ops::INIT), 1);
    }

    #[tokio::test]
    async fn test_concurrent_acquire_shares_init() {
        let net = MockNetwork::new();
        let client = StorageClient::new(net.connector(), "rpc");
        let alice = identity("alice");
        let gate = net.hold(ops::INIT);

        let (a, b, ()) = futures::join!(client.acquire(&alice), client.acquire(&alice), async {
            gate.release()
        });

        assert_eq!(a.unwrap().epoch(), b.unwrap().epoch());
        assert_eq!(net.calls(ops::INIT), 1);
    }

    #[tokio::test]
    async fn test_identity_change_discards_handle() {
        let net = MockNetwork::new();
        let client = StorageClient::new(net.connector(), "rpc");

        let alice = client.acquire(&identity("alice")).await.unwrap();
        let bob = client.acquire(&identity("bob")).await.unwrap();

        assert!(!client.is_current(&alice));
        assert!(client.is_current(&bob));
        assert_eq!(bob.owner(), &Address::new("bob"));
        assert_eq!(net.calls(ops::INIT), 2);

        assert!(client.set_endpoint("other-rpc"));
        assert!(!client.is_current(&bob));
        assert!(!client.set_endpoint("other-rpc"));
    }

    #[tokio::test]
    async fn test_handle_built_for_stale_identity_is_dropped() {
        let net = MockNetwork::new();
        let client = StorageClient::new(net.connector(), "rpc");
        let gate = net.hold(ops::INIT);
        let alice = identity("alice");

        let switch = async {
            client.bind(&identity("bob"));
            gate.release();
        };
        let (stale, ()) = futures::join!(client.acquire(&alice), switch);

        assert_eq!(stale.unwrap_err(), DriveError::Superseded);
        let bob = client.handle().await.unwrap();
        assert_eq!(bob.owner(), &Address::new("bob"));
    }

    #[tokio::test]
    async fn test_init_failure_is_a_fetch_error() {
        let net = MockNetwork::new();
        net.fail(ops::INIT, crate::SdkError::Network("rpc down".into()));
        let client = StorageClient::new(net.connector(), "rpc");

        let err = client.acquire(&identity("alice")).await.unwrap_err();
        assert!(matches!(err, DriveError::Fetch { what: "storage client", .. }));

        net.recover(ops::INIT);
        assert!(client.handle().await.is_ok());
    }
}
