//! Application state management

use std::sync::Arc;

use crate::cache::ExtractionCache;
use crate::config::{Config, StorageBackend};
use crate::extraction::{MupdfExtractor, TextExtractor};
use crate::ingest::ObjectIngestor;
use crate::storage::{MemoryStore, ObjectStore, S3Client};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    cache: ExtractionCache,
    ingestor: ObjectIngestor,
}

impl AppState {
    /// Build state around explicit store and extractor instances
    pub fn new(
        config: Config,
        store: Arc<dyn ObjectStore>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        let cache = ExtractionCache::new(store.clone(), extractor.clone(), config.cache.options());
        let ingestor = ObjectIngestor::new(store, extractor);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                cache,
                ingestor,
            }),
        }
    }

    /// Build state with the configured storage backend and MuPDF extraction
    pub async fn from_config(config: Config) -> Self {
        let store: Arc<dyn ObjectStore> = match config.storage.backend {
            StorageBackend::S3 => Arc::new(S3Client::new(&config.storage).await),
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; cached text is lost on restart");
                Arc::new(MemoryStore::new(config.storage.bucket.clone()))
            }
        };

        Self::new(config, store, Arc::new(MupdfExtractor::new()))
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the extraction cache
    pub fn cache(&self) -> &ExtractionCache {
        &self.inner.cache
    }

    /// Get the object ingestor
    pub fn ingestor(&self) -> &ObjectIngestor {
        &self.inner.ingestor
    }
}
