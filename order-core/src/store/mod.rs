pub mod factory;
pub mod repository;

use std::collections::HashSet;

pub use factory::{StoreConfig, StoreFactory, StoreRegistry};
pub use repository::{OrderStore, StoreError};

use crate::models::OrderRecord;

/// Drops records whose id has been seen before; the first occurrence wins.
///
/// Returns the surviving records and the number dropped so backends can log
/// and persist the repair only when something actually changed.
pub fn dedupe_by_id(records: Vec<OrderRecord>) -> (Vec<OrderRecord>, usize) {
    let original_len = records.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(original_len);
    let unique: Vec<OrderRecord> = records
        .into_iter()
        .filter(|record| seen.insert(record.id.clone()))
        .collect();
    let dropped = original_len - unique.len();
    (unique, dropped)
}
