use std::sync::Arc;

use crate::config::{AuditorConfig, HTTP_CLIENT_TIMEOUT_SECS};
use crate::storage::CheckStore;

pub type SharedState = Arc<AppState>;

/// Shared, immutable application state. Each analysis owns its page handle;
/// nothing here is mutated across requests apart from the store's own lock.
pub struct AppState {
    pub config: AuditorConfig,
    pub store: CheckStore,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: AuditorConfig) -> anyhow::Result<Self> {
        let store = CheckStore::new(&config.db_path)?;
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(HTTP_CLIENT_TIMEOUT_SECS))
            .pool_max_idle_per_host(4)
            .build()?;
        Ok(Self {
            config,
            store,
            http_client,
        })
    }
}
