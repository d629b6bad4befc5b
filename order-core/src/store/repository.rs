use async_trait::async_trait;
use thiserror::Error;

use crate::models::OrderRecord;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A record with this id already exists; the store is append-only.
    #[error("an order with id '{0}' already exists")]
    DuplicateId(String),

    /// The underlying storage rejected a read or write (missing directory,
    /// quota, permissions). The caller surfaces this to the user; no partial
    /// write has happened.
    #[error("storage error: {0}")]
    Storage(String),

    /// Persisted data could not be re-serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Bad backend configuration (unknown backend name, unusable location).
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Durable persistence of the ordered list of [`OrderRecord`]s, addressable
/// by id.
///
/// The contract matches the observed discipline of the system: load the full
/// list, mutate in memory, save the full list back. There is no field-level
/// update — edits are a replace-on-save by the caller.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Reads the full record list.
    ///
    /// Unreadable or corrupt data is recoverable by design: the store logs a
    /// warning and returns an empty list rather than failing the caller.
    /// Duplicate ids are repaired on the way in — the first occurrence wins,
    /// later ones are dropped, and the repaired list is persisted back as a
    /// side effect.
    async fn load_all(&self) -> Result<Vec<OrderRecord>, StoreError>;

    /// Replaces the entire persisted list.
    ///
    /// # Errors
    /// [`StoreError::Storage`] if the write is rejected; the previous
    /// contents remain intact (no partial write).
    async fn save_all(
        &self,
        records: &[OrderRecord],
    ) -> Result<(), StoreError>;

    /// Appends a new record.
    ///
    /// # Errors
    /// [`StoreError::DuplicateId`] if the id is already present.
    async fn insert(
        &self,
        record: &OrderRecord,
    ) -> Result<(), StoreError>;

    /// Removes every record whose id matches `id` (string comparison).
    /// Deleting a non-existent id is a no-op, not an error, and leaves the
    /// persisted bytes untouched.
    async fn delete_by_id(
        &self,
        id: &str,
    ) -> Result<(), StoreError>;

    /// Empties the store entirely.
    async fn clear(&self) -> Result<(), StoreError>;
}
