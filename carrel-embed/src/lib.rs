//! # carrel-embed
//!
//! Client library for turning text into embedding vectors via an external,
//! OpenAI-compatible embedding service. The rest of the carrel system depends
//! only on the [`EmbeddingClient`] trait, so the HTTP implementation can be
//! swapped for a deterministic fake in tests.
//!
//! ## Quick Start
//!
//! ```no_run
//! use carrel_embed::{EmbedConfig, EmbeddingClient, HttpEmbeddingClient};
//!
//! # async fn example() -> carrel_embed::Result<()> {
//! let client = HttpEmbeddingClient::new(
//!     EmbedConfig::new("https://api.openai.com/v1", "sk-...")
//! );
//!
//! let texts = vec!["Hello world".to_string(), "How are you?".to_string()];
//! let batch = client.embed_texts(&texts).await?;
//!
//! println!("Generated {} embeddings of dimension {}", batch.len(), batch.dimension);
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure model
//!
//! Embeddings are never fabricated locally. If the service is unreachable or
//! rejects the batch, the call fails with an [`EmbedError`] and the caller
//! decides whether the operation degrades (retrieval) or aborts (indexing).
//! A locally-invented zero or wrong-dimension vector would silently corrupt
//! any index built from the batch, which is worse than a visible failure.

pub mod client;
pub mod config;
pub mod error;

pub use client::{EmbeddingBatch, EmbeddingClient, HttpEmbeddingClient};
pub use config::{DEFAULT_EMBED_MODEL, EmbedConfig};
pub use error::{EmbedError, Result};
