//! Object ingest
//!
//! Handles "object created" notifications for documents uploaded straight to
//! the bucket: the object is read, its text extracted and written next to the
//! cache entries as `txt/<key without extension>.txt`.

mod types;

use std::sync::Arc;

pub use types::{IngestReport, S3Bucket, S3Entity, S3Event, S3EventRecord, S3Object};

use crate::cache::{CACHE_PREFIX, CACHE_SUFFIX};
use crate::error::{AppError, Result};
use crate::extraction::{run_extraction, TextExtractor};
use crate::storage::{Lookup, ObjectStore, TEXT_CONTENT_TYPE};

/// Event name prefix of the notifications that carry a new object
const OBJECT_CREATED: &str = "ObjectCreated";

/// Extracts text for objects announced by S3 event notifications
#[derive(Clone)]
pub struct ObjectIngestor {
    store: Arc<dyn ObjectStore>,
    extractor: Arc<dyn TextExtractor>,
}

impl ObjectIngestor {
    pub fn new(store: Arc<dyn ObjectStore>, extractor: Arc<dyn TextExtractor>) -> Self {
        Self { store, extractor }
    }

    /// Ingest the object named by the first record of `event`
    pub async fn ingest(&self, event: &S3Event) -> Result<IngestReport> {
        let record = event
            .records
            .first()
            .ok_or_else(|| AppError::BadRequest("event has no records".to_string()))?;

        let bucket = &record.s3.bucket.name;
        if bucket != self.store.bucket() {
            return Err(AppError::BadRequest(format!(
                "event for bucket {} but this server owns {}",
                bucket,
                self.store.bucket()
            )));
        }

        let source_key = decode_object_key(&record.s3.object.key)?;

        if let Some(name) = record
            .event_name
            .as_deref()
            .filter(|name| !name.starts_with(OBJECT_CREATED))
        {
            tracing::debug!(key = %source_key, event = %name, "Skipping non-create event");
            return Ok(IngestReport::skipped(source_key));
        }

        // Our own output lands in the same bucket and triggers events too
        if source_key.starts_with(CACHE_PREFIX) {
            tracing::debug!(key = %source_key, "Skipping extracted-text object");
            return Ok(IngestReport::skipped(source_key));
        }

        let data = match self.store.get(&source_key).await? {
            Lookup::Hit(data) => data,
            Lookup::Miss => return Err(AppError::NotFound(source_key)),
        };

        let text = run_extraction(self.extractor.clone(), Arc::new(data)).await?;

        let output_key = text_key_for(&source_key);
        self.store
            .put(&output_key, text.as_bytes().to_vec(), TEXT_CONTENT_TYPE)
            .await?;

        let characters = text.chars().count();
        tracing::info!(
            source = %source_key,
            output = %output_key,
            characters,
            "Ingested uploaded document"
        );

        Ok(IngestReport {
            source_key,
            output_key: Some(output_key),
            characters,
            skipped: false,
        })
    }
}

/// Decode an object key as it appears in an S3 event (`+` is a space)
pub fn decode_object_key(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|key| key.into_owned())
        .map_err(|e| AppError::BadRequest(format!("invalid object key {}: {}", raw, e)))
}

/// Output key for an ingested object: `books/a.pdf` -> `txt/books/a.txt`
///
/// Only the extension of the final path segment is replaced.
pub fn text_key_for(source_key: &str) -> String {
    let (dir, name) = match source_key.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, source_key),
    };

    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };

    match dir {
        Some(dir) => format!("{}{}/{}{}", CACHE_PREFIX, dir, stem, CACHE_SUFFIX),
        None => format!("{}{}{}", CACHE_PREFIX, stem, CACHE_SUFFIX),
    }
}
