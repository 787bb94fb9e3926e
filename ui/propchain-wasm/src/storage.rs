//! `localStorage`-backed address store.
//!
//! Values are stored raw (no JSON encoding) so the key stays readable by
//! other scripts on the page.

use pc_wallet_client::{AddressStore, StorageError};
use wasm_bindgen::JsValue;

#[derive(Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        window
            .local_storage()
            .map_err(js_error)?
            .ok_or(StorageError::Unavailable)
    }
}

impl AddressStore for LocalStorageStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?.get_item(key).map_err(js_error)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?.set_item(key, value).map_err(js_error)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        Self::storage()?.remove_item(key).map_err(js_error)
    }
}

fn js_error(err: JsValue) -> StorageError {
    StorageError::Operation(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}
