//! Error types for the retrieval subsystem
//!
//! The taxonomy distinguishes three kinds of failure:
//!
//! - **Recoverable per-item**: [`RetrieverError::Extraction`], one unreadable
//!   document; the indexer logs it and keeps going.
//! - **Operation-aborting**: [`RetrieverError::Embedding`], where the embedding
//!   service is down or rejected the batch; the current reindex or retrieve
//!   fails, other workspaces are unaffected, and any previously persisted
//!   index stays intact.
//! - **Integrity defects**: [`RetrieverError::DimensionMismatch`],
//!   [`RetrieverError::EmptyIndex`], [`RetrieverError::ChunkVectorMismatch`],
//!   [`RetrieverError::CorruptIndex`]; these should never occur given the
//!   persistence invariants; if one fires it signals a defect, not something
//!   to retry.
//!
//! [`RetrieverError::WorkspaceNotIndexed`] is expected and benign: callers
//! treat it as "no results yet".

use std::path::PathBuf;

/// Result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrieverError>;

/// Error type for indexing, storage and retrieval operations.
#[derive(Debug, thiserror::Error)]
pub enum RetrieverError {
    /// A workspace has no persisted index yet (never indexed, or indexing
    /// produced no text).
    #[error("workspace `{workspace}` has not been indexed yet")]
    WorkspaceNotIndexed { workspace: String },

    /// Searched an index holding zero vectors.
    #[error("vector index holds no vectors")]
    EmptyIndex,

    /// A vector's length disagrees with the index dimension.
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The chunk list and the vector index disagree in length.
    #[error("chunk/vector misalignment: {chunks} chunks vs {vectors} vectors")]
    ChunkVectorMismatch { chunks: usize, vectors: usize },

    /// A persisted index file failed structural validation.
    #[error("corrupt index data: {message}")]
    CorruptIndex { message: String },

    /// Text extraction failed for one document.
    #[error("failed to extract text from {path}: {message}")]
    Extraction { path: PathBuf, message: String },

    /// The embedding service call failed.
    #[error("embedding service error: {source}")]
    Embedding {
        #[from]
        source: carrel_embed::EmbedError,
    },

    /// File system errors while reading or writing workspace state.
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Malformed persisted JSON (chunk list or chat history).
    #[error("malformed persisted data: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// Generic errors from other libraries.
    #[error("external error: {source}")]
    External {
        #[from]
        source: anyhow::Error,
    },
}

impl RetrieverError {
    /// Create a per-file extraction error.
    pub fn extraction<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::Extraction {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a corrupt-index error with a custom message.
    pub fn corrupt_index<S: Into<String>>(message: S) -> Self {
        Self::CorruptIndex {
            message: message.into(),
        }
    }
}
