//! Workspace indexing pipeline.
//!
//! [`Indexer::reindex`] rebuilds one workspace's retrieval state from scratch:
//!
//! ```text
//! docs/ → TextExtractor → concatenate → TokenWindowChunker
//!                                            ↓
//!        WorkspaceStore.persist ← VectorIndex.build ← EmbeddingClient
//! ```
//!
//! The rebuild is wholesale by design (no incremental update), and the new
//! index is assembled fully in memory before anything is persisted, so a
//! failed or cancelled reindex leaves the previously persisted index intact.

use crate::error::{Result, RetrieverError};
use crate::retrieval::extract::TextExtractor;
use crate::retrieval::vector_index::VectorIndex;
use crate::storage::WorkspaceStore;
use carrel_context::TokenWindowChunker;
use carrel_embed::EmbeddingClient;
use std::sync::Arc;
use tracing::{info, warn};

/// Rebuilds a workspace's chunk list and vector index from its documents.
pub struct Indexer {
    store: WorkspaceStore,
    chunker: TokenWindowChunker,
    extractor: Arc<dyn TextExtractor>,
    embedder: Arc<dyn EmbeddingClient>,
}

impl Indexer {
    /// Create an indexer with the default chunking policy (300-token windows,
    /// 40 tokens of overlap).
    pub fn new(
        store: WorkspaceStore,
        extractor: Arc<dyn TextExtractor>,
        embedder: Arc<dyn EmbeddingClient>,
    ) -> Self {
        Self {
            store,
            chunker: TokenWindowChunker::default(),
            extractor,
            embedder,
        }
    }

    /// Replace the chunking policy (builder style).
    pub fn with_chunker(self, chunker: TokenWindowChunker) -> Self {
        Self { chunker, ..self }
    }

    /// Re-index every document in the workspace. Returns the number of
    /// chunks indexed.
    ///
    /// Per-file extraction failures are logged and skipped; one unreadable
    /// document does not abort the rest. If no document yields any text, no
    /// index is written and the workspace stays un-indexed; persisting an
    /// empty, unsearchable index would help nobody. An embedding failure
    /// aborts the reindex with the prior persisted index untouched.
    pub async fn reindex(&self, workspace: &str) -> Result<usize> {
        let documents = self.store.list_documents(workspace).await?;
        info!(workspace, documents = documents.len(), "starting reindex");

        let mut combined = String::new();
        for path in &documents {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            match self.extractor.extract_text(path).await {
                Ok(text) => {
                    // Per-file delimiter so retrieved passages carry their origin.
                    combined.push_str(&format!("\n--- File: {name} ---\n{text}\n"));
                }
                Err(err) => {
                    warn!(file = %name, error = %err, "skipping unreadable document");
                }
            }
        }

        if combined.trim().is_empty() {
            info!(workspace, "no extractable text; leaving workspace un-indexed");
            return Ok(0);
        }

        let chunks = self.chunker.chunk(&combined)?;
        let batch = self.embedder.embed_texts(&chunks).await?;
        if batch.len() != chunks.len() {
            return Err(RetrieverError::ChunkVectorMismatch {
                chunks: chunks.len(),
                vectors: batch.len(),
            });
        }
        let index = VectorIndex::build(&batch.embeddings)?;
        self.store.persist(workspace, &chunks, &index).await?;

        info!(workspace, chunks = chunks.len(), "reindex complete");
        Ok(chunks.len())
    }
}
