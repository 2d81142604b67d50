//! S3 event notification types

use serde::{Deserialize, Serialize};

/// S3 event notification (only the fields ingest reads)
#[derive(Debug, Clone, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3EventRecord {
    #[serde(rename = "eventName", default)]
    pub event_name: Option<String>,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    /// URL-encoded object key
    pub key: String,
}

/// Outcome of ingesting one uploaded object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub source_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_key: Option<String>,
    pub characters: usize,
    pub skipped: bool,
}

impl IngestReport {
    /// Report for an object that was deliberately not processed
    pub fn skipped(source_key: String) -> Self {
        Self {
            source_key,
            output_key: None,
            characters: 0,
            skipped: true,
        }
    }
}
