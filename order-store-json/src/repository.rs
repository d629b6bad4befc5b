use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use order_core::models::OrderRecord;
use order_core::store::{OrderStore, StoreError, dedupe_by_id};

/// Current on-disk schema version. Bump when the document layout changes.
pub const SCHEMA_VERSION: u32 = 1;

/// File names the pre-consolidation tooling wrote, in merge-priority order:
/// the management key first (it was authoritative), the form key second.
const LEGACY_FILES: [&str; 2] = ["purchaseOrders.json", "orders.json"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreDocument {
    #[allow(dead_code)]
    schema_version: u32,
    orders: Vec<OrderRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoreDocumentRef<'a> {
    schema_version: u32,
    orders: &'a [OrderRecord],
}

/// [`OrderStore`] backed by a single pretty-printed JSON file:
/// `{"schemaVersion": 1, "orders": [...]}`.
///
/// Legacy bare-array files from the two pre-consolidation storage keys are
/// migrated into the versioned file the first time a store is opened at a
/// location that has no consolidated file yet.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Opens (or prepares) the store at `path`, creating parent directories
    /// and running the one-time legacy migration if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("cannot create '{}': {e}", parent.display()))
            })?;
        }

        let store = Self { path };
        store.migrate_legacy()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merges the legacy key files into the consolidated document. Runs only
    /// when the consolidated file does not exist yet; unreadable legacy data
    /// is skipped with a warning rather than blocking the migration.
    fn migrate_legacy(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            return Ok(());
        }

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut merged: Vec<OrderRecord> = Vec::new();
        let mut found_any = false;

        for name in LEGACY_FILES {
            let legacy = dir.join(name);
            let Ok(text) = fs::read_to_string(&legacy) else {
                continue;
            };
            found_any = true;
            match serde_json::from_str::<Vec<OrderRecord>>(&text) {
                Ok(mut records) => merged.append(&mut records),
                Err(error) => {
                    warn!(file = %legacy.display(), %error, "skipping unreadable legacy order file");
                }
            }
        }

        if !found_any {
            return Ok(());
        }

        let (unique, dropped) = dedupe_by_id(merged);
        if dropped > 0 {
            info!(dropped, "dropped duplicate ids while merging legacy order files");
        }
        self.write_document(&unique)?;
        info!(
            file = %self.path.display(),
            count = unique.len(),
            "migrated legacy order data to schema v{SCHEMA_VERSION}"
        );
        Ok(())
    }

    /// Reads the document. A missing file is an empty store; an unreadable
    /// document is recoverable — it logs a warning and yields an empty list.
    fn read_document(&self) -> Result<Vec<OrderRecord>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Storage(format!(
                    "cannot read '{}': {e}",
                    self.path.display()
                )));
            }
        };

        match serde_json::from_str::<StoreDocument>(&text) {
            Ok(document) => Ok(document.orders),
            Err(error) => {
                warn!(
                    file = %self.path.display(),
                    %error,
                    "order store is unreadable; treating it as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Serializes and writes the full document via temp file + rename, so
    /// the previous contents survive any failed write.
    fn write_document(
        &self,
        records: &[OrderRecord],
    ) -> Result<(), StoreError> {
        let document = StoreDocumentRef {
            schema_version: SCHEMA_VERSION,
            orders: records,
        };
        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .map_err(|e| StoreError::Storage(format!("cannot write '{}': {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            StoreError::Storage(format!("cannot replace '{}': {e}", self.path.display()))
        })?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for JsonFileStore {
    async fn load_all(&self) -> Result<Vec<OrderRecord>, StoreError> {
        let records = self.read_document()?;
        let (unique, dropped) = dedupe_by_id(records);
        if dropped > 0 {
            warn!(dropped, "repaired duplicate order ids on load");
            self.write_document(&unique)?;
        }
        Ok(unique)
    }

    async fn save_all(
        &self,
        records: &[OrderRecord],
    ) -> Result<(), StoreError> {
        self.write_document(records)
    }

    async fn insert(
        &self,
        record: &OrderRecord,
    ) -> Result<(), StoreError> {
        let mut records = self.load_all().await?;
        if records.iter().any(|existing| existing.is_same_order(record)) {
            return Err(StoreError::DuplicateId(record.id.clone()));
        }
        records.push(record.clone());
        self.write_document(&records)
    }

    async fn delete_by_id(
        &self,
        id: &str,
    ) -> Result<(), StoreError> {
        let records = self.read_document()?;
        let before = records.len();
        let remaining: Vec<OrderRecord> = records
            .into_iter()
            .filter(|record| !record.matches_id(id))
            .collect();

        // Nothing matched: leave the file untouched.
        if remaining.len() == before {
            return Ok(());
        }
        self.write_document(&remaining)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.write_document(&[])
    }
}
