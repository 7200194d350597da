//! Query-time retrieval.
//!
//! [`Retriever::retrieve`] is the read side of the pipeline: load the
//! workspace's persisted index, embed the query as a one-item batch, search,
//! and map the returned positions back to chunk texts through the aligned
//! chunk list.
//!
//! Retrieval is an optional enhancement to chat, never a hard dependency, so
//! it fails soft in the two expected cases: an un-indexed workspace and an
//! unreachable embedding service both yield an empty passage list. Integrity
//! errors (a torn or misaligned persisted pair) are real errors and
//! propagate.

use crate::error::{Result, RetrieverError};
use crate::storage::WorkspaceStore;
use carrel_embed::EmbeddingClient;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default number of passages returned to the chat flow.
pub const DEFAULT_TOP_K: usize = 5;

/// Answers queries with the most relevant persisted chunks of one workspace.
pub struct Retriever {
    store: WorkspaceStore,
    embedder: Arc<dyn EmbeddingClient>,
}

impl Retriever {
    pub fn new(store: WorkspaceStore, embedder: Arc<dyn EmbeddingClient>) -> Self {
        Self { store, embedder }
    }

    /// Return up to `k` chunk texts most relevant to `query`, best match
    /// first.
    ///
    /// An un-indexed workspace and an embedding-service failure both return
    /// an empty list rather than an error.
    pub async fn retrieve(&self, workspace: &str, query: &str, k: usize) -> Result<Vec<String>> {
        let (index, chunks) = match self.store.load(workspace).await {
            Ok(loaded) => loaded,
            Err(RetrieverError::WorkspaceNotIndexed { .. }) => {
                debug!(workspace, "workspace not indexed; no passages");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        let query_vector = match self.embedder.embed_text(query).await {
            Ok(vector) => vector,
            Err(err) => {
                warn!(error = %err, "query embedding failed; returning no passages");
                return Ok(Vec::new());
            }
        };

        let hits = index.search(&query_vector, k)?;
        // Positions are in range: load() verified chunk/vector alignment.
        Ok(hits
            .into_iter()
            .map(|(position, _distance)| chunks[position].clone())
            .collect())
    }
}
