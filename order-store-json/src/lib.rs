//! JSON-file backend for the order store.
//!
//! One schema-versioned file holds the full record list. Writes go through a
//! temp file and rename so a failed write never leaves a half-written store.

mod factory;
mod repository;

pub use factory::JsonStoreFactory;
pub use repository::{JsonFileStore, SCHEMA_VERSION};
