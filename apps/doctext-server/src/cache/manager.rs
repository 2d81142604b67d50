//! Read-through / write-through extraction cache
//!
//! One request moves through:
//!
//! ```text
//! Start -> Decoded -> KeyComputed -> CacheHit -> Done
//!                                 -> CacheMiss -> Extracted -> Stored -> Done
//! ```
//!
//! Any edge other than the two into `Done` can fail the request. A lookup
//! that reports "not found" is the miss path; every other lookup failure is
//! a storage error and extraction is never attempted.

use std::sync::Arc;

use base64::{
    alphabet,
    engine::{general_purpose, DecodePaddingMode, GeneralPurpose},
    Engine,
};

use crate::error::{AppError, Result, StorageError};
use crate::extraction::{run_extraction, TextExtractor};
use crate::storage::{Lookup, ObjectStore, TEXT_CONTENT_TYPE};

use super::flight::{InFlight, Role};
use super::key::{CacheKey, KeySource};
use super::types::{ExtractionResponse, WriteFailurePolicy};

/// Standard alphabet, padding optional
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    general_purpose::PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Tunables for [`ExtractionCache`]
#[derive(Debug, Clone, Copy)]
pub struct CacheOptions {
    pub key_source: KeySource,
    pub single_flight: bool,
    pub write_failure: WriteFailurePolicy,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            key_source: KeySource::default(),
            single_flight: true,
            write_failure: WriteFailurePolicy::default(),
        }
    }
}

/// Content-addressed extraction cache over an object store
#[derive(Clone)]
pub struct ExtractionCache {
    inner: Arc<ExtractionCacheInner>,
}

struct ExtractionCacheInner {
    store: Arc<dyn ObjectStore>,
    extractor: Arc<dyn TextExtractor>,
    options: CacheOptions,
    in_flight: InFlight,
}

impl ExtractionCache {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        extractor: Arc<dyn TextExtractor>,
        options: CacheOptions,
    ) -> Self {
        Self {
            inner: Arc::new(ExtractionCacheInner {
                store,
                extractor,
                options,
                in_flight: InFlight::new(),
            }),
        }
    }

    /// Extract the text of a base64-encoded document, serving it from the
    /// cache when an entry for the same content exists
    pub async fn handle(&self, filename: &str, encoded: &str) -> Result<ExtractionResponse> {
        let data = decode_payload(encoded)?;
        let key = self.inner.options.key_source.derive(encoded, &data);
        let object_key = key.object_key();

        tracing::debug!(
            filename = %filename,
            key = %object_key,
            bytes = data.len(),
            "Looking up extraction cache"
        );

        match self.inner.store.get(&object_key).await? {
            Lookup::Hit(stored) => {
                let text = String::from_utf8(stored)
                    .map_err(|_| StorageError::InvalidUtf8(object_key.clone()))?;

                tracing::info!(filename = %filename, key = %object_key, cached = true, "Cache hit");

                Ok(ExtractionResponse {
                    filename: filename.to_string(),
                    text,
                    cached: true,
                })
            }
            Lookup::Miss => {
                let (text, role) = self.populate(&key, data).await;
                let text = text?;

                tracing::info!(
                    filename = %filename,
                    key = %object_key,
                    cached = false,
                    joined = (role == Role::Follower),
                    characters = text.chars().count(),
                    "Cache miss populated"
                );

                Ok(ExtractionResponse {
                    filename: filename.to_string(),
                    text,
                    cached: false,
                })
            }
        }
    }

    /// Extract and store, sharing the work with concurrent misses when
    /// single-flight is enabled
    async fn populate(&self, key: &CacheKey, data: Vec<u8>) -> (Result<String>, Role) {
        let store = self.inner.store.clone();
        let extractor = self.inner.extractor.clone();
        let object_key = key.object_key();
        let policy = self.inner.options.write_failure;
        let work = move || extract_and_store(store, extractor, object_key, data, policy);

        if self.inner.options.single_flight {
            self.inner.in_flight.run(key, work).await
        } else {
            (work().await, Role::Leader)
        }
    }
}

async fn extract_and_store(
    store: Arc<dyn ObjectStore>,
    extractor: Arc<dyn TextExtractor>,
    object_key: String,
    data: Vec<u8>,
    policy: WriteFailurePolicy,
) -> Result<String> {
    let text = run_extraction(extractor, Arc::new(data))
        .await
        .map_err(|e| {
            tracing::warn!(key = %object_key, "Extraction failed: {}", e);
            e
        })?;

    if let Err(e) = store
        .put(&object_key, text.as_bytes().to_vec(), TEXT_CONTENT_TYPE)
        .await
    {
        match policy {
            WriteFailurePolicy::Fail => return Err(e.into()),
            WriteFailurePolicy::Degrade => {
                tracing::warn!(key = %object_key, "Cache write failed, returning uncached text: {}", e);
            }
        }
    }

    Ok(text)
}

/// Decode a base64 document payload
///
/// ASCII whitespace (line wrapping) is ignored and padding is optional.
pub fn decode_payload(encoded: &str) -> Result<Vec<u8>> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if compact.is_empty() {
        return Err(AppError::BadRequest("file_content is empty".to_string()));
    }

    PAYLOAD_ENGINE
        .decode(compact.as_bytes())
        .map_err(|e| AppError::BadRequest(format!("file_content is not valid base64: {}", e)))
}
