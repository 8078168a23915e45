//! Storage SDK bridge over the host page's JavaScript adapter.
//!
//! The page exposes `window.scoopDrive` with a `connect(owner, endpoint)`
//! function resolving to a drive object. Every drive method returns a promise
//! of plain JSON-shaped values, decoded here with `serde_wasm_bindgen`.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect, Uint8Array};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::File;

use scoop_core::{
    AccountId, AccountInfo, Address, CreatedAccount, SdkConnector, SdkError, Signature, SizeSpec,
    StorageSdk, UploadFile, UploadReceipt,
};

use crate::config::SDK_GLOBAL;
use crate::utils::{dom, js_error_message};

/// Builds [`JsSdk`] handles for the orchestrator.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsConnector;

impl SdkConnector for JsConnector {
    fn connect(&self, owner: &Address, endpoint: &str) -> Rc<dyn StorageSdk> {
        Rc::new(JsSdk {
            owner: owner.clone(),
            endpoint: endpoint.to_string(),
            drive: RefCell::new(None),
        })
    }
}

/// One drive object of the JavaScript SDK, created by [`StorageSdk::init`].
pub struct JsSdk {
    owner: Address,
    endpoint: String,
    drive: RefCell<Option<Object>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountEntry {
    public_key: AccountId,
}

#[derive(Deserialize)]
struct TxResponse {
    #[serde(alias = "txid")]
    transaction_signature: Signature,
}

#[derive(Deserialize)]
struct ObjectList {
    keys: Vec<String>,
}

/// Map a promise rejection to an [`SdkError`].
///
/// Wallet prompts that the user declines surface as rejections; everything
/// else is treated as a transport failure.
fn rejection(err: &JsValue) -> SdkError {
    let message = js_error_message(err);
    let lower = message.to_lowercase();
    if lower.contains("reject") || lower.contains("denied") || lower.contains("declined") {
        SdkError::Rejected(message)
    } else if lower.contains("not found") || lower.contains("does not exist") {
        SdkError::NotFound(message)
    } else {
        SdkError::Network(message)
    }
}

fn invalid(err: impl std::fmt::Display) -> SdkError {
    SdkError::InvalidResponse(err.to_string())
}

/// Call `target[method](...args)` and await the result if it is a promise.
async fn call(target: &Object, method: &str, args: &[JsValue]) -> Result<JsValue, SdkError> {
    let function = Reflect::get(target, &method.into())
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok())
        .ok_or_else(|| invalid(format!("missing SDK method `{}`", method)))?;

    let js_args: Array = args.iter().collect();
    let value = function
        .apply(target, &js_args)
        .map_err(|e| rejection(&e))?;

    match value.dyn_into::<Promise>() {
        Ok(promise) => JsFuture::from(promise).await.map_err(|e| rejection(&e)),
        Err(value) => Ok(value),
    }
}

fn decode<T: DeserializeOwned>(value: JsValue) -> Result<T, SdkError> {
    serde_wasm_bindgen::from_value(value).map_err(invalid)
}

/// Wrap an upload payload in a browser `File`.
fn to_js_file(file: &UploadFile) -> Result<File, SdkError> {
    let bytes = Uint8Array::from(file.bytes.as_slice());
    let parts = Array::of1(&bytes);
    File::new_with_u8_array_sequence(&parts, &file.name).map_err(|e| invalid(js_error_message(&e)))
}

impl JsSdk {
    fn drive(&self) -> Result<Object, SdkError> {
        self.drive
            .borrow()
            .clone()
            .ok_or_else(|| invalid("storage SDK used before init"))
    }

    async fn invoke(&self, method: &str, args: &[JsValue]) -> Result<JsValue, SdkError> {
        let drive = self.drive()?;
        call(&drive, method, args).await
    }

    async fn invoke_tx(&self, method: &str, args: &[JsValue]) -> Result<Signature, SdkError> {
        let response: TxResponse = decode(self.invoke(method, args).await?)?;
        Ok(response.transaction_signature)
    }
}

#[async_trait(?Send)]
impl StorageSdk for JsSdk {
    async fn init(&self) -> Result<(), SdkError> {
        let window = dom::window().ok_or_else(|| SdkError::Network("window not available".into()))?;
        let adapter = Reflect::get(&window, &SDK_GLOBAL.into())
            .ok()
            .and_then(|v| v.dyn_into::<Object>().ok())
            .ok_or_else(|| invalid(format!("`window.{}` is not installed", SDK_GLOBAL)))?;

        let drive = call(
            &adapter,
            "connect",
            &[self.owner.as_str().into(), self.endpoint.as_str().into()],
        )
        .await?
        .dyn_into::<Object>()
        .map_err(|_| invalid("connect did not return a drive"))?;

        *self.drive.borrow_mut() = Some(drive);
        tracing::debug!(owner = %self.owner, endpoint = %self.endpoint, "storage SDK initialized");
        Ok(())
    }

    async fn get_storage_accounts(&self) -> Result<Vec<AccountId>, SdkError> {
        let entries: Vec<AccountEntry> = decode(self.invoke("getStorageAccounts", &[]).await?)?;
        Ok(entries.into_iter().map(|e| e.public_key).collect())
    }

    async fn get_storage_account(&self, id: &AccountId) -> Result<AccountInfo, SdkError> {
        decode(self.invoke("getStorageAccount", &[id.as_str().into()]).await?)
    }

    async fn create_storage_account(
        &self,
        name: &str,
        size: &SizeSpec,
    ) -> Result<CreatedAccount, SdkError> {
        let value = self
            .invoke(
                "createStorageAccount",
                &[name.into(), size.to_string().into()],
            )
            .await?;
        decode(value)
    }

    async fn delete_storage_account(&self, id: &AccountId) -> Result<Signature, SdkError> {
        self.invoke_tx("deleteStorageAccount", &[id.as_str().into()])
            .await
    }

    async fn make_storage_immutable(&self, id: &AccountId) -> Result<Signature, SdkError> {
        self.invoke_tx("makeStorageImmutable", &[id.as_str().into()])
            .await
    }

    async fn upload_file(
        &self,
        id: &AccountId,
        file: &UploadFile,
    ) -> Result<UploadReceipt, SdkError> {
        let js_file = to_js_file(file)?;
        let value = self
            .invoke("uploadFile", &[id.as_str().into(), js_file.into()])
            .await?;
        decode(value)
    }

    async fn delete_file(&self, id: &AccountId, url: &str) -> Result<Signature, SdkError> {
        // deleteFile answers with a message rather than a signature.
        let value = self
            .invoke("deleteFile", &[id.as_str().into(), url.into()])
            .await?;
        let signature = Reflect::get(&value, &"message".into())
            .ok()
            .and_then(|m| m.as_string())
            .unwrap_or_default();
        Ok(Signature::new(signature))
    }

    async fn list_objects(&self, id: &AccountId) -> Result<Vec<String>, SdkError> {
        let list: ObjectList = decode(self.invoke("listObjects", &[id.as_str().into()]).await?)?;
        Ok(list.keys)
    }
}
