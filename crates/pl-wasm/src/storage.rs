//! Browser backends: `window.localStorage` and `Date.now()`.

use pl_core::clock::Clock;
use pl_core::storage::{Storage, StorageError};

/// `Storage` over `window.localStorage`.
///
/// Pages without storage access (sandboxed iframes, some private modes)
/// get a backend that reads as empty and rejects writes.
pub struct LocalStorage {
    inner: Option<web_sys::Storage>,
}

impl LocalStorage {
    pub fn new() -> Self {
        let inner = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if inner.is_none() {
            log::warn!("localStorage unavailable; projects will not persist");
        }
        Self { inner }
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.inner.as_ref()?.get_item(key).ok().flatten()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let Some(storage) = &self.inner else {
            return Err(StorageError::Rejected {
                key: key.to_string(),
                reason: "localStorage unavailable".to_string(),
            });
        };
        // Throws QuotaExceededError when full; the old value stays in place.
        storage
            .set_item(key, value)
            .map_err(|e| StorageError::Rejected {
                key: key.to_string(),
                reason: js_error_message(&e),
            })
    }
}

/// `Date.now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsClock;

impl Clock for JsClock {
    fn now_ms(&self) -> u64 {
        js_sys::Date::now().max(0.0) as u64
    }
}

pub(crate) fn js_error_message(value: &wasm_bindgen::JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &"message".into())
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}
