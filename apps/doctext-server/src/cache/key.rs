//! Cache key derivation
//!
//! A cache key is the SHA-256 digest of the submitted document, hex encoded.
//! Entries live in the bucket at `txt/<digest>.txt`.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

/// Namespace prefix for extraction cache objects
pub const CACHE_PREFIX: &str = "txt/";

/// Suffix for extraction cache objects
pub const CACHE_SUFFIX: &str = ".txt";

/// Content fingerprint used as the storage lookup key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Fingerprint raw document bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(fingerprint(data))
    }

    /// Fingerprint the encoded payload exactly as received
    pub fn from_encoded(encoded: &str) -> Self {
        Self(fingerprint(encoded.as_bytes()))
    }

    /// Hex digest
    pub fn digest(&self) -> &str {
        &self.0
    }

    /// Object key of the cache entry for this fingerprint
    pub fn object_key(&self) -> String {
        format!("{}{}{}", CACHE_PREFIX, self.0, CACHE_SUFFIX)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// SHA-256 of `data` as 64 lowercase hex characters
pub fn fingerprint(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Which representation of the payload is fingerprinted
///
/// `Decoded` hashes the document bytes, so clients that wrap lines or drop
/// padding still land on the same entry. `Encoded` hashes the base64 text
/// verbatim and only matches byte-identical payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeySource {
    Encoded,
    #[default]
    Decoded,
}

impl KeySource {
    pub fn derive(self, encoded: &str, decoded: &[u8]) -> CacheKey {
        match self {
            KeySource::Encoded => CacheKey::from_encoded(encoded),
            KeySource::Decoded => CacheKey::from_bytes(decoded),
        }
    }
}

impl FromStr for KeySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "encoded" => Ok(KeySource::Encoded),
            "decoded" => Ok(KeySource::Decoded),
            other => Err(format!("expected 'encoded' or 'decoded', got '{}'", other)),
        }
    }
}
