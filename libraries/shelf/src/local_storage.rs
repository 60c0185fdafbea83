use wasm_bindgen::JsValue;

use crate::data_model::{Backend, BackendError};

/// `window.localStorage`, as a shelf backend.
#[derive(Clone, Debug)]
pub struct LocalStorageBackend {
    storage: web_sys::Storage,
}

impl LocalStorageBackend {
    pub fn new() -> Result<Self, BackendError> {
        let window =
            web_sys::window().ok_or_else(|| BackendError("no window available".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| BackendError("localStorage is disabled".to_string()))?;
        Ok(Self { storage })
    }
}

fn js_error(e: JsValue) -> BackendError {
    BackendError(format!("{e:?}"))
}

impl Backend for LocalStorageBackend {
    fn read(&self, key: &str) -> Result<Option<String>, BackendError> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.storage.set_item(key, value).map_err(js_error)
    }

    fn delete(&self, key: &str) -> Result<(), BackendError> {
        self.storage.remove_item(key).map_err(js_error)
    }
}
