//! This is a small library for keeping application records in browser-local key-value storage.
//! It was written for the vocabulary trainer, so it doesn't include much that was not needed for that project.
//!
//! Storage strategy:
//! 1. Every record lives under one string key and is stored as JSON.
//! 2. Records are versioned: the stored JSON is a tagged wrapper (`{"version": "V1", ...}`), so the data model can evolve without breaking data already on disk.
//! 3. Reading never fails. A missing key, an unreadable backend or a corrupt record all load as the record's default value (and get logged).
//! 4. Writing marks the key as dirty. Listeners registered on the shelf get notified about dirty keys when the caller drains notifications.
//!
//! The last point matters because listeners usually call back into code that wants to borrow the owner of the shelf again, so notifications are handed out as closures instead of being invoked while the shelf is borrowed.

#[cfg(target_arch = "wasm32")]
#[cfg(feature = "local-storage")]
pub mod local_storage;

pub mod data_model;

pub use data_model::{
    Backend, BackendError, DirtyState, ListenerKey, MemoryBackend, Record, Shelf, ShelfError,
};
