//! Configuration management for the Doctext server

use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::cache::{CacheOptions, KeySource, WriteFailurePolicy};

/// Default request body limit: 64MB of JSON (roughly 48MB of document)
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Memory,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub key_source: KeySource,
    pub single_flight: bool,
    pub write_failure: WriteFailurePolicy,
}

impl CacheConfig {
    pub fn options(&self) -> CacheOptions {
        CacheOptions {
            key_source: self.key_source,
            single_flight: self.single_flight,
            write_failure: self.write_failure,
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let backend = match var("STORAGE_BACKEND").as_deref() {
            None | Some("s3") => StorageBackend::S3,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "STORAGE_BACKEND",
                    reason: format!("expected 's3' or 'memory', got '{}'", other),
                })
            }
        };

        let bucket = match (var("S3_BUCKET"), backend) {
            (Some(bucket), _) => bucket,
            (None, StorageBackend::Memory) => "doctext".to_string(),
            (None, StorageBackend::S3) => return Err(ConfigError::Missing("S3_BUCKET")),
        };

        Ok(Config {
            server: ServerConfig {
                host: var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or("SERVER_PORT", var("SERVER_PORT"), 3000)?,
                max_body_bytes: parse_or(
                    "DOCTEXT_MAX_BODY_BYTES",
                    var("DOCTEXT_MAX_BODY_BYTES"),
                    DEFAULT_MAX_BODY_BYTES,
                )?,
            },
            storage: StorageConfig {
                backend,
                bucket,
                endpoint: var("S3_ENDPOINT"),
                region: var("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                access_key: var("S3_ACCESS_KEY"),
                secret_key: var("S3_SECRET_KEY"),
            },
            cache: CacheConfig {
                key_source: parse_or("DOCTEXT_KEY_SOURCE", var("DOCTEXT_KEY_SOURCE"), KeySource::default())?,
                single_flight: parse_or("DOCTEXT_SINGLE_FLIGHT", var("DOCTEXT_SINGLE_FLIGHT"), true)?,
                write_failure: parse_or(
                    "DOCTEXT_WRITE_FAILURE",
                    var("DOCTEXT_WRITE_FAILURE"),
                    WriteFailurePolicy::default(),
                )?,
            },
        })
    }
}

fn parse_or<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var: name,
            reason: e.to_string(),
        }),
    }
}
