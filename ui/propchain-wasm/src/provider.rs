//! `window.ethereum` adapter.
//!
//! Reads the injected object through `Reflect` so optional members
//! (`isMetaMask`, `providers`, `on`, `removeListener`) can be probed safely.

use async_trait::async_trait;
use js_sys::{Array, Function, Promise, Reflect};
use pc_wallet_client::{
    ACCOUNTS_CHANGED, AccountsHandler, ErrorCode, ListenerId, ProviderError, RpcRequest,
    WalletProvider,
};
use pc_wallet_types::WalletAddress;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

pub struct InjectedProvider {
    handle: JsValue,
    listeners: RefCell<HashMap<u64, Closure<dyn FnMut(JsValue)>>>,
    next_listener: Cell<u64>,
}

impl InjectedProvider {
    /// Looks up the provider at the global injection slot.
    pub fn from_window() -> Option<Rc<dyn WalletProvider>> {
        let window = web_sys::window()?;
        let handle = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if handle.is_undefined() || handle.is_null() {
            return None;
        }
        Some(Rc::new(Self::new(handle)))
    }

    fn new(handle: JsValue) -> Self {
        Self {
            handle,
            listeners: RefCell::new(HashMap::new()),
            next_listener: Cell::new(0),
        }
    }

    fn property(&self, name: &str) -> JsValue {
        Reflect::get(&self.handle, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED)
    }

    fn method(&self, name: &str) -> Option<Function> {
        self.property(name).dyn_into::<Function>().ok()
    }
}

#[async_trait(?Send)]
impl WalletProvider for InjectedProvider {
    fn is_metamask(&self) -> bool {
        self.property("isMetaMask").as_bool().unwrap_or(false)
    }

    fn providers(&self) -> Vec<Rc<dyn WalletProvider>> {
        let nested = self.property("providers");
        if !Array::is_array(&nested) {
            return Vec::new();
        }
        Array::from(&nested)
            .iter()
            .filter(|p| p.is_object())
            .map(|p| Rc::new(Self::new(p)) as Rc<dyn WalletProvider>)
            .collect()
    }

    async fn request(&self, request: RpcRequest) -> Result<serde_json::Value, ProviderError> {
        let request_fn = self
            .method("request")
            .ok_or_else(|| ProviderError::new(None, "provider has no request method"))?;

        let args = request
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| ProviderError::new(None, e.to_string()))?;

        let returned = request_fn
            .call1(&self.handle, &args)
            .map_err(provider_error)?;
        let granted = JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(provider_error)?;

        serde_wasm_bindgen::from_value(granted).map_err(|e| ProviderError::new(None, e.to_string()))
    }

    fn subscribe_accounts(&self, handler: AccountsHandler) -> Option<ListenerId> {
        let on = self.method("on")?;

        let callback = Closure::wrap(Box::new(move |accounts: JsValue| {
            handler(parse_accounts(&accounts));
        }) as Box<dyn FnMut(JsValue)>);

        if let Err(err) = on.call2(
            &self.handle,
            &JsValue::from_str(ACCOUNTS_CHANGED),
            callback.as_ref(),
        ) {
            warn!("failed to subscribe to account changes: {:?}", err);
            return None;
        }

        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().insert(id, callback);
        Some(ListenerId(id))
    }

    fn unsubscribe_accounts(&self, id: ListenerId) {
        let Some(callback) = self.listeners.borrow_mut().remove(&id.0) else {
            return;
        };

        let Some(remove) = self.method("removeListener") else {
            // The provider keeps calling it, so it must outlive us.
            callback.forget();
            return;
        };

        if let Err(err) = remove.call2(
            &self.handle,
            &JsValue::from_str(ACCOUNTS_CHANGED),
            callback.as_ref(),
        ) {
            warn!("failed to remove account listener: {:?}", err);
            callback.forget();
        }
    }
}

/// Non-array payloads are treated as an empty account list.
fn parse_accounts(value: &JsValue) -> Vec<WalletAddress> {
    if !Array::is_array(value) {
        return Vec::new();
    }
    Array::from(value)
        .iter()
        .filter_map(|account| account.as_string())
        .map(WalletAddress)
        .collect()
}

/// Maps a rejected promise value (`{ code, message }`) into a `ProviderError`.
fn provider_error(err: JsValue) -> ProviderError {
    let code_value = Reflect::get(&err, &JsValue::from_str("code")).unwrap_or(JsValue::UNDEFINED);
    let code = match code_value.as_f64() {
        Some(numeric) => Some(ErrorCode::Numeric(numeric as i64)),
        None => code_value.as_string().map(ErrorCode::Text),
    };

    let message = Reflect::get(&err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{:?}", err));

    ProviderError::new(code, message)
}
