//! Storage module for S3-compatible backends
//!
//! Supports AWS S3, MinIO, Cloudflare R2 and an in-process memory store.

mod memory;
mod s3_client;
mod types;

pub use memory::MemoryStore;
pub use s3_client::S3Client;
pub use types::*;
