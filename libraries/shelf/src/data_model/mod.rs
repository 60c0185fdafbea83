#[path = "1-backend.rs"]
mod backend;

#[path = "2-record.rs"]
mod record;

#[path = "3-dirty-tracker.rs"]
mod dirty_tracker;

#[path = "4-shelf.rs"]
mod shelf;

pub use backend::*;
pub use dirty_tracker::*;
pub use record::*;
pub use shelf::*;

#[cfg_attr(target_arch = "wasm32", wasm_bindgen::prelude::wasm_bindgen)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ListenerKey(pub(crate) slotmap::DefaultKey);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Counter {
        count: u32,
    }

    #[derive(serde::Serialize, serde::Deserialize)]
    #[serde(tag = "version")]
    enum VersionedCounter {
        V1(Counter),
    }

    impl Record for Counter {
        fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
            serde_json::to_value(VersionedCounter::V1(self.clone()))
        }

        fn from_json(json: &serde_json::Value) -> Result<Self, serde_json::Error> {
            serde_json::from_value::<VersionedCounter>(json.clone()).map(
                |versioned| match versioned {
                    VersionedCounter::V1(counter) => counter,
                },
            )
        }
    }

    #[test]
    fn test_missing_key_loads_default() {
        let shelf = Shelf::new(MemoryBackend::new());
        let counter: Counter = shelf.load("counter");
        assert_eq!(counter, Counter::default());
    }

    #[test]
    fn test_save_then_load() {
        let backend = MemoryBackend::new();
        let mut shelf = Shelf::new(backend.clone());
        shelf.save("counter", &Counter { count: 3 }, None).unwrap();

        // a second shelf on the same backend sees the write
        let other = Shelf::new(backend.clone());
        assert_eq!(other.load::<Counter>("counter"), Counter { count: 3 });
        let raw = backend.read("counter").unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["version"], "V1");
    }

    #[test]
    fn test_corrupt_record_loads_default() {
        let backend = MemoryBackend::new();
        backend.write("counter", "{not json").unwrap();
        backend.write("other", r#"{"version":"V9"}"#).unwrap();

        let shelf = Shelf::new(backend);
        assert_eq!(shelf.load::<Counter>("counter"), Counter::default());
        assert_eq!(shelf.load::<Counter>("other"), Counter::default());
    }

    #[test]
    fn test_remove() {
        let backend = MemoryBackend::new();
        let mut shelf = Shelf::new(backend.clone());
        shelf.save("counter", &Counter { count: 1 }, None).unwrap();
        shelf.remove("counter", None).unwrap();
        assert_eq!(backend.read("counter").unwrap(), None);
        assert_eq!(shelf.load::<Counter>("counter"), Counter::default());
    }
}
