//! # Record
//! Records are the unit Shelf persists. The application state is loaded from records at startup and written back on every change.
//! For robustness, records must be versionable. This means there is another type that is a "versioned" version, which is the one that is stored in the backend.
//! This ensures that we can evolve the data model without breaking existing data.

pub trait Record: Sized + Default {
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error>;
    fn from_json(json: &serde_json::Value) -> Result<Self, serde_json::Error>;
}
