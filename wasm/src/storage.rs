//! Browser `localStorage` adapter for the client storage port

use shared::{ClientError, ClientResult, KeyValueStore};
use wasm_bindgen::JsValue;

/// `window.localStorage`
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn open() -> ClientResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| ClientError::Storage("no window object".into()))?;
        let storage = window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| ClientError::Storage("localStorage unavailable".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.storage.set_item(key, value).map_err(|e| {
            // Quota errors end here; the cart carries on in memory.
            web_sys::console::warn_2(&JsValue::from_str("localStorage write failed:"), &e);
            js_error(e)
        })
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        self.storage.remove_item(key).map_err(js_error)
    }
}

fn js_error(value: JsValue) -> ClientError {
    ClientError::Storage(
        value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value)),
    )
}
