//! Text extraction
//!
//! Turns raw document bytes into plain text. The production extractor is
//! backed by MuPDF; anything implementing [`TextExtractor`] can stand in for
//! it (the tests use counting fakes).
//!
//! MuPDF work is CPU-bound and not async-aware, so [`run_extraction`] moves
//! it onto tokio's blocking pool.

mod format;
mod mupdf_extractor;

use std::sync::Arc;

pub use self::format::DocumentFormat;
pub use self::mupdf_extractor::MupdfExtractor;

use crate::error::ExtractionError;

/// Synchronous text extraction capability
pub trait TextExtractor: Send + Sync + 'static {
    fn extract_text(&self, data: &[u8]) -> Result<String, ExtractionError>;
}

/// Run an extractor on the blocking pool
pub async fn run_extraction(
    extractor: Arc<dyn TextExtractor>,
    data: Arc<Vec<u8>>,
) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || extractor.extract_text(&data))
        .await
        .map_err(|e| ExtractionError::TaskFailed(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl TextExtractor for Upper {
        fn extract_text(&self, data: &[u8]) -> Result<String, ExtractionError> {
            Ok(String::from_utf8_lossy(data).to_uppercase())
        }
    }

    struct Panics;

    impl TextExtractor for Panics {
        fn extract_text(&self, _data: &[u8]) -> Result<String, ExtractionError> {
            panic!("extractor blew up")
        }
    }

    #[tokio::test]
    async fn test_run_extraction() {
        let text = run_extraction(Arc::new(Upper), Arc::new(b"hello".to_vec()))
            .await
            .unwrap();
        assert_eq!(text, "HELLO");
    }

    #[tokio::test]
    async fn test_run_extraction_panic_is_task_failure() {
        let result = run_extraction(Arc::new(Panics), Arc::new(vec![])).await;
        assert!(matches!(result, Err(ExtractionError::TaskFailed(_))));
    }
}
