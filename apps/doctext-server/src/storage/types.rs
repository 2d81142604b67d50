//! Storage types

use async_trait::async_trait;

use crate::error::StorageError;

/// Content type written for cached extraction results
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Outcome of reading a key from the object store
///
/// "Not found" is a normal outcome here, not an error. Every other failure
/// comes back as `Err(StorageError)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Hit(Vec<u8>),
    Miss,
}

/// Durable blob store addressed by key within a single bucket
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket this store reads from and writes to
    fn bucket(&self) -> &str;

    /// Read an object
    async fn get(&self, key: &str) -> Result<Lookup, StorageError>;

    /// Write an object, replacing any existing one
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), StorageError>;
}
