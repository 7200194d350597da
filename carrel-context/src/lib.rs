//! Token-window text segmentation for the carrel retrieval system.
//!
//! Documents uploaded into a workspace are flattened into one long text, and
//! that text has to be cut into pieces small enough to embed and retrieve
//! individually. This crate owns that policy: fixed-size windows over the
//! tokenized text, with a configurable overlap so that a sentence falling on a
//! window boundary still appears with context on both sides.
//!
//! The tokenizer is `cl100k_base` (via [`tiktoken_rs`]), so window sizes are
//! measured in the same units the embedding service bills and truncates in.
//!
//! ```
//! use carrel_context::TokenWindowChunker;
//!
//! let chunker = TokenWindowChunker::new(300, 40);
//! let chunks = chunker.chunk("some extracted document text").unwrap();
//! assert_eq!(chunks.len(), 1); // short input: one chunk, equal to the input
//! ```

pub mod text;

pub use text::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, TokenWindowChunker};
