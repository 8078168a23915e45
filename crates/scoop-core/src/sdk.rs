//! Boundary to the external storage SDK and object gateway.
//!
//! The core never speaks the storage network's protocol itself. The browser
//! shell implements these traits over the JavaScript SDK; tests use
//! [`crate::mock`].

use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SdkError;
use crate::models::{AccountId, Address, SizeSpec, StorageAccount, UploadFile};

/// Transaction signature returned by a confirmed mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    pub fn new(sig: impl Into<String>) -> Self {
        Self(sig.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account metadata as returned by `getStorageAccount`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccountInfo {
    pub identifier: String,
    #[serde(alias = "owner1")]
    pub owner: Address,
    pub reserved_bytes: u64,
    pub current_usage: u64,
    pub immutable: bool,
}

impl AccountInfo {
    /// Combine with the account key into the cached model.
    pub fn into_account(self, id: AccountId) -> StorageAccount {
        StorageAccount {
            id,
            display_name: self.identifier,
            owner: self.owner,
            quota_bytes: self.reserved_bytes,
            used_bytes: self.current_usage,
            immutable: self.immutable,
        }
    }
}

/// Result of `createStorageAccount`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CreatedAccount {
    pub shdw_bucket: AccountId,
    pub transaction_signature: Signature,
}

/// Result of `uploadFile`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct UploadReceipt {
    pub finalized_locations: Vec<String>,
    #[serde(default)]
    pub message: String,
}

/// Storage network client bound to one wallet and one RPC endpoint.
#[async_trait(?Send)]
pub trait StorageSdk {
    /// One-time session setup. Called once per handle, never per operation.
    async fn init(&self) -> Result<(), SdkError>;

    async fn get_storage_accounts(&self) -> Result<Vec<AccountId>, SdkError>;

    async fn get_storage_account(&self, id: &AccountId) -> Result<AccountInfo, SdkError>;

    async fn create_storage_account(
        &self,
        name: &str,
        size: &SizeSpec,
    ) -> Result<CreatedAccount, SdkError>;

    async fn delete_storage_account(&self, id: &AccountId) -> Result<Signature, SdkError>;

    async fn make_storage_immutable(&self, id: &AccountId) -> Result<Signature, SdkError>;

    async fn upload_file(
        &self,
        id: &AccountId,
        file: &UploadFile,
    ) -> Result<UploadReceipt, SdkError>;

    /// Delete by object URL (see [`crate::models::object_url`]).
    async fn delete_file(&self, id: &AccountId, url: &str) -> Result<Signature, SdkError>;

    /// Object keys in the account.
    async fn list_objects(&self, id: &AccountId) -> Result<Vec<String>, SdkError>;
}

/// Builds SDK instances for an identity and endpoint.
pub trait SdkConnector {
    fn connect(&self, owner: &Address, endpoint: &str) -> Rc<dyn StorageSdk>;
}

/// Header-only size lookup against the object gateway.
#[async_trait(?Send)]
pub trait SizeProbe {
    /// `Ok(None)` when the response carries no content length.
    async fn content_length(&self, url: &str) -> Result<Option<u64>, SdkError>;
}
