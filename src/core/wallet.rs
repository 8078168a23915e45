//! Wallet connection logic using web-sys.
//!
//! Provides Phantom-compatible Solana wallet connectivity through
//! direct JavaScript interop via Reflect API.

use js_sys::{Function, Object, Promise, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen_futures::JsFuture;

use crate::config::{WALLET_SESSION_KEY, WALLET_TIMEOUT_MS};
use crate::core::error::WalletError;
use crate::utils::{RaceResult, dom, js_error_message, race_with_timeout};

/// Get the window.solana object injected by the wallet extension.
fn get_provider() -> Result<Object, WalletError> {
    let window = dom::window().ok_or(WalletError::NoWindow)?;
    Reflect::get(&window, &"solana".into())
        .ok()
        .and_then(|v| v.dyn_into::<Object>().ok())
        .ok_or(WalletError::NotInstalled)
}

/// Look up a method on the provider.
fn provider_fn(provider: &Object, name: &str) -> Result<Function, WalletError> {
    Reflect::get(provider, &name.into())
        .map_err(|_| WalletError::RequestCreationFailed)?
        .dyn_into::<Function>()
        .map_err(|_| WalletError::RequestCreationFailed)
}

/// Base58 string of `value.publicKey`, if present.
fn public_key_of(value: &JsValue) -> Option<String> {
    let key = Reflect::get(value, &"publicKey".into()).ok()?;
    public_key_string(&key)
}

/// Base58 string of a `PublicKey` object.
fn public_key_string(key: &JsValue) -> Option<String> {
    if key.is_null() || key.is_undefined() {
        return None;
    }
    let to_string = Reflect::get(key, &"toString".into())
        .ok()?
        .dyn_into::<Function>()
        .ok()?;
    to_string.call0(key).ok()?.as_string()
}

/// Check if Phantom (or compatible wallet) is installed
pub fn is_available() -> bool {
    get_provider().is_ok()
}

/// Request wallet connection (shows the wallet popup)
pub async fn connect() -> Result<String, WalletError> {
    let provider = get_provider()?;
    let connect = provider_fn(&provider, "connect")?;

    let promise: Promise = connect
        .call0(&provider)
        .map_err(|_| WalletError::RequestCreationFailed)?
        .into();

    let result = JsFuture::from(promise)
        .await
        .map_err(|e| WalletError::RequestRejected(js_error_message(&e)))?;

    public_key_of(&result)
        .or_else(|| public_key_of(&provider))
        .ok_or(WalletError::NoAccount)
}

/// Reconnect to a previously trusted wallet (no popup) with timeout
pub async fn get_account() -> Option<String> {
    let provider = get_provider().ok()?;
    let connect = provider_fn(&provider, "connect").ok()?;

    let args = Object::new();
    Reflect::set(&args, &"onlyIfTrusted".into(), &JsValue::TRUE).ok()?;

    let request_promise: Promise = connect.call1(&provider, &args).ok()?.into();

    match race_with_timeout(request_promise, WALLET_TIMEOUT_MS).await {
        RaceResult::Completed(result) => {
            public_key_of(&result).or_else(|| public_key_of(&provider))
        }
        RaceResult::TimedOut | RaceResult::Error(_) => None,
    }
}

/// Disconnect from the wallet. Failures are ignored.
pub async fn disconnect() {
    let Ok(provider) = get_provider() else {
        return;
    };
    let Ok(disconnect) = provider_fn(&provider, "disconnect") else {
        return;
    };
    if let Ok(value) = disconnect.call0(&provider) {
        if let Ok(promise) = value.dyn_into::<Promise>() {
            let _ = JsFuture::from(promise).await;
        }
    }
}

/// Check if user has previously logged in (localStorage flag).
pub fn has_session() -> bool {
    dom::local_storage()
        .and_then(|s| s.get_item(WALLET_SESSION_KEY).ok().flatten())
        .is_some()
}

/// Save login session to localStorage.
pub fn save_session() {
    if let Some(storage) = dom::local_storage() {
        let _ = storage.set_item(WALLET_SESSION_KEY, "1");
    }
}

/// Clear login session from localStorage.
pub fn clear_session() {
    if let Some(storage) = dom::local_storage() {
        let _ = storage.remove_item(WALLET_SESSION_KEY);
    }
}

// ============================================================================
// Event Listeners
// ============================================================================

/// Subscribe to a provider event.
///
/// The closure is leaked with `forget()`; listeners live as long as the page.
fn on_event(event: &str, handler: Closure<dyn Fn(JsValue)>) -> Result<(), WalletError> {
    let provider = get_provider()?;
    let on_fn = provider_fn(&provider, "on")?;

    on_fn
        .call2(&provider, &event.into(), handler.as_ref())
        .map_err(|_| WalletError::RequestCreationFailed)?;

    handler.forget();
    Ok(())
}

/// Register a callback for when the connected account changes.
///
/// The callback receives `Some(address)` when the wallet switched to another
/// account, or `None` when the wallet no longer exposes one.
pub fn on_account_changed(callback: impl Fn(Option<String>) + 'static) -> Result<(), WalletError> {
    let closure = Closure::wrap(Box::new(move |key: JsValue| {
        callback(public_key_string(&key));
    }) as Box<dyn Fn(JsValue)>);

    on_event("accountChanged", closure)
}

/// Register a callback for when the wallet disconnects.
pub fn on_disconnect(callback: impl Fn() + 'static) -> Result<(), WalletError> {
    let closure = Closure::wrap(Box::new(move |_: JsValue| {
        callback();
    }) as Box<dyn Fn(JsValue)>);

    on_event("disconnect", closure)
}
