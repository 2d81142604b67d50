//! Doctext Server Library
//!
//! Document text extraction behind a content-addressed cache in S3.
//! The server binary is in main.rs; everything it wires together lives here
//! so integration tests can build the same router.
//!
//! # Modules
//!
//! - `cache`: fingerprinting and the read-through/write-through cache
//! - `extraction`: MuPDF text extraction on the blocking pool
//! - `storage`: object store trait, S3 and in-memory backends
//! - `ingest`: extraction of documents uploaded directly to the bucket
//! - `routes`: HTTP surface

pub mod cache;
pub mod config;
pub mod error;
pub mod extraction;
pub mod ingest;
pub mod routes;
pub mod state;
pub mod storage;
