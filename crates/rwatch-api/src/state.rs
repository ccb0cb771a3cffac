//! Application state.

use std::sync::Arc;

use rwatch_store::RecordStore;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<RecordStore>,
}

impl AppState {
    /// Create new application state, opening the record store.
    pub async fn new(config: ApiConfig) -> Result<Self, rwatch_store::StorageError> {
        let store = RecordStore::open(&config.data_dir).await?;
        Ok(Self {
            config,
            store: Arc::new(store),
        })
    }
}
