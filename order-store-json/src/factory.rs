use async_trait::async_trait;

use order_core::store::{OrderStore, StoreConfig, StoreError, StoreFactory};

use crate::repository::JsonFileStore;

/// [`StoreFactory`] for the JSON-file backend.
///
/// Register this with an [`order_core::store::StoreRegistry`] to make the
/// `"json"` backend available:
///
/// ```rust,no_run
/// use order_core::store::StoreRegistry;
/// use order_store_json::JsonStoreFactory;
///
/// let mut registry = StoreRegistry::new();
/// registry.register(Box::new(JsonStoreFactory));
/// ```
pub struct JsonStoreFactory;

#[async_trait]
impl StoreFactory for JsonStoreFactory {
    fn backend_name(&self) -> &'static str {
        "json"
    }

    /// Open the store file named by `config.location`.
    ///
    /// The location is a file path; parent directories are created as
    /// needed, and legacy bare-array files next to it are migrated into the
    /// consolidated document the first time the location is used.
    async fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn OrderStore>, StoreError> {
        let store = JsonFileStore::open(&config.location)?;
        Ok(Box::new(store))
    }
}
