//! `window.localStorage` as a [`KeyValueStore`].

use wasm_bindgen::JsValue;
use wg_core::StorageError;
use wg_core::storage::KeyValueStore;

/// Handle to the page's local storage. Missing storage (private mode,
/// sandboxed iframes) reads as empty and fails writes.
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

impl LocalStorage {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("localStorage unavailable; changes will not persist");
        }
        Self { storage }
    }
}

fn backend_error(e: &JsValue) -> StorageError {
    StorageError::Backend(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match &self.storage {
            Some(storage) => storage.get_item(key).map_err(|e| backend_error(&e)),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        match &self.storage {
            Some(storage) => storage.set_item(key, value).map_err(|e| backend_error(&e)),
            None => Err(StorageError::Backend("localStorage unavailable".into())),
        }
    }
}
