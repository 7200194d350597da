//! Indexing and retrieval pipeline for document workspaces.

pub mod extract;
pub mod indexer;
pub mod retriever;
pub mod vector_index;

pub use extract::{PlainTextExtractor, TextExtractor};
pub use indexer::Indexer;
pub use retriever::{DEFAULT_TOP_K, Retriever};
pub use vector_index::VectorIndex;
