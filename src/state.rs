use std::sync::{Mutex, MutexGuard};

use crate::config::AppConfig;
use crate::db::EntityStore;
use crate::errors::AppError;

pub struct AppState {
    pub store: Mutex<Box<dyn EntityStore>>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig, store: impl EntityStore + 'static) -> Self {
        Self {
            store: Mutex::new(Box::new(store)),
            config,
        }
    }

    /// Locks the store for the duration of one engine operation.
    pub fn store(&self) -> Result<MutexGuard<'_, Box<dyn EntityStore>>, AppError> {
        self.store
            .lock()
            .map_err(|_| AppError::Internal("entity store lock poisoned".to_string()))
    }
}
