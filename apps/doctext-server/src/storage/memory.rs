//! In-process object store
//!
//! Used for local development (`STORAGE_BACKEND=memory`) and as the fake
//! store in tests. Read and write failures can be injected.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::StorageError;

use super::types::{Lookup, ObjectStore};

/// Memory-backed object store
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryStoreInner>,
}

struct MemoryStoreInner {
    bucket: String,
    objects: RwLock<HashMap<String, Vec<u8>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(MemoryStoreInner {
                bucket: bucket.into(),
                objects: RwLock::new(HashMap::new()),
                fail_reads: AtomicBool::new(false),
                fail_writes: AtomicBool::new(false),
                reads: AtomicUsize::new(0),
                writes: AtomicUsize::new(0),
            }),
        }
    }

    /// Seed an object without counting it as a write
    pub fn insert(&self, key: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.inner.objects.write().insert(key.into(), data.into());
    }

    /// Raw contents of an object, if present
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.objects.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every subsequent `get` fail with a non-"not found" error
    pub fn fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `put` fail
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `get` calls served (including failed ones)
    pub fn reads(&self) -> usize {
        self.inner.reads.load(Ordering::SeqCst)
    }

    /// Number of `put` calls served (including failed ones)
    pub fn writes(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn bucket(&self) -> &str {
        &self.inner.bucket
    }

    async fn get(&self, key: &str) -> Result<Lookup, StorageError> {
        self.inner.reads.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!("read of {}", key)));
        }

        Ok(match self.inner.objects.read().get(key) {
            Some(data) => Lookup::Hit(data.clone()),
            None => Lookup::Miss,
        })
    }

    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<(), StorageError> {
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!("write of {}", key)));
        }

        self.inner.objects.write().insert(key.to_string(), data);
        Ok(())
    }
}
