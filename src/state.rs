use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::JournalStore;
use crate::services::UserService;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JournalStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn JournalStore>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.store.clone())
    }
}
