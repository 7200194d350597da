//! carrel-retriever: per-workspace semantic retrieval over uploaded documents
//!
//! This crate turns the documents uploaded into a named workspace into a
//! searchable, persisted semantic index, and answers natural-language queries
//! with the most relevant passages. It is the core of a retrieval-augmented
//! chat assistant; the chat-completion and embedding services are external
//! collaborators behind trait seams.
//!
//! ## Key Modules
//!
//! - **[`retrieval`]**: chunk/embed/index pipeline ([`retrieval::Indexer`]),
//!   query-time search ([`retrieval::Retriever`]), the brute-force
//!   [`retrieval::VectorIndex`], and the document-extraction seam
//! - **[`storage`]**: per-workspace persistence with atomic replace semantics
//! - **[`chat`]**: the retrieval-augmented chat turn and the completion seam
//! - **[`error`]**: the typed error taxonomy
//!
//! ## Architecture
//!
//! ```text
//! docs/ → TextExtractor → TokenWindowChunker → EmbeddingClient
//!                                                   ↓
//! Retriever ← WorkspaceStore (chunks.json + index.bin) ← VectorIndex
//!     ↓
//! ChatEngine → CompletionClient
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use carrel_embed::{EmbedConfig, HttpEmbeddingClient};
//! use carrel_retriever::retrieval::{Indexer, PlainTextExtractor, Retriever};
//! use carrel_retriever::storage::WorkspaceStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = WorkspaceStore::new("storage");
//! let embedder = Arc::new(HttpEmbeddingClient::new(
//!     EmbedConfig::new("https://api.openai.com/v1", "sk-..."),
//! ));
//!
//! store.add_document("project x", "notes.txt", b"meeting notes").await?;
//! let indexer = Indexer::new(store.clone(), Arc::new(PlainTextExtractor), embedder.clone());
//! let count = indexer.reindex("project x").await?;
//! println!("indexed {count} chunks");
//!
//! let retriever = Retriever::new(store, embedder);
//! let passages = retriever.retrieve("project x", "what was decided?", 5).await?;
//! # Ok(())
//! # }
//! ```

pub mod chat;
pub mod error;
pub mod retrieval;
pub mod storage;

pub use error::{Result, RetrieverError};
