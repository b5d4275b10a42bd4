pub mod config;
pub mod controller;
pub mod document;
pub mod errors;
pub mod logger;
pub mod query;
pub mod store;
pub mod types;
pub mod utils;

use crate::config::ServiceConfig;
use crate::controller::TourController;
use crate::errors::DbError;
use crate::store::MemoryStore;
use std::sync::Arc;

/// The tour service: a store plus the controller wired to it.
pub struct Service {
    store: Arc<MemoryStore>,
    controller: TourController<MemoryStore>,
}

impl Service {
    /// Opens the service described by `cfg`. With a `data_path` the collection is backed by
    /// a write-ahead log at that path, otherwise it lives in memory only.
    ///
    /// # Errors
    /// Returns an error if the log cannot be opened or replayed.
    pub fn open(cfg: &ServiceConfig) -> Result<Self, DbError> {
        let store = match &cfg.data_path {
            Some(path) => Arc::new(MemoryStore::open(path)?),
            None => Arc::new(MemoryStore::new()),
        };
        let controller = TourController::with_config(Arc::clone(&store), cfg);
        Ok(Self { store, controller })
    }

    /// Creates a non-persistent service with default settings.
    #[must_use]
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        let controller = TourController::new(Arc::clone(&store));
        Self { store, controller }
    }

    #[must_use]
    pub const fn controller(&self) -> &TourController<MemoryStore> {
        &self.controller
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }
}
