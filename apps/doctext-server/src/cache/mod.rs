//! Content-addressed extraction cache
//!
//! Extraction results are memoized in the object store under a key derived
//! from the document content, so the same document is only ever extracted
//! once (barring concurrent first requests with single-flight disabled).
//! Entries are immutable and never expire.

mod flight;
mod key;
mod manager;
mod types;

pub use key::{fingerprint, CacheKey, KeySource, CACHE_PREFIX, CACHE_SUFFIX};
pub use manager::{decode_payload, CacheOptions, ExtractionCache};
pub use types::{ExtractRequest, ExtractionResponse, WriteFailurePolicy};
