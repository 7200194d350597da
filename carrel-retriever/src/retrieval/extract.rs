//! Document-to-text extraction seam.
//!
//! Turning an uploaded file (PDF, spreadsheet, image, ...) into plain text is
//! an external concern. The indexer only depends on the [`TextExtractor`]
//! trait; [`PlainTextExtractor`] is the bundled implementation for UTF-8 text
//! files, and richer format support plugs in behind the same trait.

use crate::error::{Result, RetrieverError};
use async_trait::async_trait;
use std::path::Path;

/// Extracts the text content of one document file.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract the full text of the document at `path`.
    ///
    /// Failures are per-file: the indexer logs and skips the document rather
    /// than aborting the whole workspace.
    async fn extract_text(&self, path: &Path) -> Result<String>;
}

/// Extractor for plain UTF-8 text documents.
///
/// Anything that does not decode as UTF-8 is treated as unreadable, which is
/// exactly the per-file failure the indexer knows how to skip.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract_text(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RetrieverError::extraction(path, e.to_string()))?;
        String::from_utf8(bytes)
            .map_err(|_| RetrieverError::extraction(path, "not valid UTF-8 text"))
    }
}
