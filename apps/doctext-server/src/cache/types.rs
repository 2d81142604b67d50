//! Extraction request and response types

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Body of `POST /extract`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractRequest {
    /// Display name, echoed back untouched
    pub filename: String,

    /// Base64-encoded document
    pub file_content: String,
}

/// Extracted text for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResponse {
    pub filename: String,
    pub text: String,

    /// `true` when the text was served from the cache without extraction
    pub cached: bool,
}

/// What to do when the extracted text cannot be written back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteFailurePolicy {
    /// Fail the request with a storage error
    #[default]
    Fail,
    /// Return the fresh text uncached and log a warning
    Degrade,
}

impl FromStr for WriteFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail" => Ok(WriteFailurePolicy::Fail),
            "degrade" => Ok(WriteFailurePolicy::Degrade),
            other => Err(format!("expected 'fail' or 'degrade', got '{}'", other)),
        }
    }
}
