use std::rc::Rc;

use crate::data_model::{Backend, BackendError, DirtyState, DirtyTracker, ListenerKey, Record};

#[derive(Debug, thiserror::Error)]
pub enum ShelfError {
    #[error("storage backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct Shelf {
    backend: Rc<dyn Backend>,
    dirty: DirtyTracker,
    listeners: slotmap::SlotMap<slotmap::DefaultKey, Rc<dyn Fn(ListenerKey, String)>>,
}

impl Shelf {
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self::from_shared(Rc::new(backend))
    }

    pub fn from_shared(backend: Rc<dyn Backend>) -> Self {
        Self {
            backend,
            dirty: DirtyTracker::default(),
            listeners: Default::default(),
        }
    }

    /// Loads the record stored under `key`. Missing, unreadable and corrupt records all come back as `R::default()`.
    pub fn load<R: Record>(&self, key: &str) -> R {
        let raw = match self.backend.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::debug!("Nothing stored under {key}, starting empty");
                return R::default();
            }
            Err(e) => {
                log::warn!("Could not read {key} ({e}), starting empty");
                return R::default();
            }
        };

        serde_json::from_str::<serde_json::Value>(&raw)
            .and_then(|json| R::from_json(&json))
            .inspect_err(|e| {
                log::warn!("Record stored under {key} is unreadable ({e}), starting empty");
            })
            .unwrap_or_default()
    }

    /// Writes `record` under `key`. The key is marked dirty even if the write fails, since the caller's in-memory state already changed.
    pub fn save<R: Record>(
        &mut self,
        key: &str,
        record: &R,
        modifier: Option<ListenerKey>,
    ) -> Result<(), ShelfError> {
        self.dirty.mark_dirty(key, modifier);
        let json = record.to_json()?;
        self.backend.write(key, &json.to_string())?;
        Ok(())
    }

    pub fn remove(&mut self, key: &str, modifier: Option<ListenerKey>) -> Result<(), ShelfError> {
        self.dirty.mark_dirty(key, modifier);
        self.backend.delete(key)?;
        Ok(())
    }

    pub fn dirty_state(&self, key: &str) -> DirtyState {
        self.dirty.state(key)
    }

    /// The listener is invoked with the key whenever a key it did not modify itself was written.
    pub fn register_listener(
        &mut self,
        listener: impl Fn(ListenerKey, String) + 'static,
    ) -> ListenerKey {
        let key = self.listeners.insert(Rc::new(listener));
        ListenerKey(key)
    }

    pub fn unregister_listener(&mut self, key: ListenerKey) {
        self.listeners.remove(key.0);
    }

    pub fn drain_due_notifications(&mut self) -> Vec<Box<dyn FnOnce()>> {
        let mut notifications: Vec<Box<dyn FnOnce()>> = Vec::new();
        for (record_key, state) in self.dirty.drain() {
            let exclude_key = match state {
                DirtyState::Clean => continue,
                DirtyState::DirtyExcept(key) => Some(key),
                DirtyState::DirtyAll => None,
            };

            for (key, listener) in self.listeners.iter() {
                let listener_key = ListenerKey(key);
                if exclude_key == Some(listener_key) {
                    continue;
                }
                let listener = listener.clone();
                let record_key = record_key.clone();
                notifications.push(Box::new(move || listener(listener_key, record_key)));
            }
        }
        notifications
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::data_model::MemoryBackend;

    #[derive(Default)]
    struct Note(String);

    impl Record for Note {
        fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
            Ok(serde_json::json!({ "version": "V1", "text": self.0 }))
        }

        fn from_json(json: &serde_json::Value) -> Result<Self, serde_json::Error> {
            Ok(Note(json["text"].as_str().unwrap_or_default().to_string()))
        }
    }

    struct BrokenBackend;

    impl Backend for BrokenBackend {
        fn read(&self, _key: &str) -> Result<Option<String>, BackendError> {
            Err(BackendError("quota exceeded".to_string()))
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), BackendError> {
            Err(BackendError("quota exceeded".to_string()))
        }

        fn delete(&self, _key: &str) -> Result<(), BackendError> {
            Err(BackendError("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_unreadable_backend_loads_default() {
        let shelf = Shelf::new(BrokenBackend);
        assert_eq!(shelf.load::<Note>("note").0, "");
    }

    #[test]
    fn test_failed_write_still_marks_dirty() {
        let mut shelf = Shelf::new(BrokenBackend);
        let result = shelf.save("note", &Note("hi".to_string()), None);
        assert!(matches!(result, Err(ShelfError::Backend(_))));
        assert_eq!(shelf.dirty_state("note"), DirtyState::DirtyAll);
    }

    #[test]
    fn test_modifier_is_not_notified() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut shelf = Shelf::new(MemoryBackend::new());

        let seen_a = seen.clone();
        let a = shelf.register_listener(move |_, key| seen_a.borrow_mut().push(("a", key)));
        let seen_b = seen.clone();
        shelf.register_listener(move |_, key| seen_b.borrow_mut().push(("b", key)));

        shelf.save("note", &Note("hi".to_string()), Some(a)).unwrap();
        for notification in shelf.drain_due_notifications() {
            notification();
        }

        assert_eq!(*seen.borrow(), vec![("b", "note".to_string())]);
        assert!(shelf.drain_due_notifications().is_empty());
    }

    #[test]
    fn test_unregistered_listener_is_silent() {
        let seen = Rc::new(RefCell::new(0));
        let mut shelf = Shelf::new(MemoryBackend::new());
        let seen_a = seen.clone();
        let a = shelf.register_listener(move |_, _| *seen_a.borrow_mut() += 1);
        shelf.unregister_listener(a);

        shelf.save("note", &Note("hi".to_string()), None).unwrap();
        for notification in shelf.drain_due_notifications() {
            notification();
        }
        assert_eq!(*seen.borrow(), 0);
    }
}
