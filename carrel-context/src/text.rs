//! Overlapping token-window chunking.
//!
//! The splitting policy is deliberately simple: encode the whole input with
//! `cl100k_base`, slide a fixed-size window over the token stream, and decode
//! each window back to text independently. The window start advances by
//! `chunk_size - overlap` tokens per step, so consecutive chunks share
//! `overlap` tokens of context. The final window may be shorter than
//! `chunk_size`; an input shorter than one window produces exactly one chunk
//! equal to the whole input.
//!
//! Overlap buys boundary context at the cost of `overlap / chunk_size`
//! redundant token coverage, which is acceptable at workspace scale.

use anyhow::Result;
use tiktoken_rs::{CoreBPE, cl100k_base};

/// Default window size in tokens.
pub const DEFAULT_CHUNK_SIZE: usize = 300;

/// Default number of tokens shared between consecutive windows.
pub const DEFAULT_CHUNK_OVERLAP: usize = 40;

/// Splits text into overlapping fixed-size token windows.
pub struct TokenWindowChunker {
    bpe: CoreBPE,
    chunk_size: usize,
    overlap: usize,
}

impl std::fmt::Debug for TokenWindowChunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenWindowChunker")
            .field("chunk_size", &self.chunk_size)
            .field("overlap", &self.overlap)
            .finish()
    }
}

impl TokenWindowChunker {
    /// Creates a chunker with the given window size and overlap, in tokens.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero or `overlap >= chunk_size` (the window
    /// would never advance), or if the embedded `cl100k_base` tokenizer data
    /// fails to load.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be positive");
        assert!(
            overlap < chunk_size,
            "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
        );
        let bpe = cl100k_base().expect("cl100k_base tokenizer should load from embedded data");
        TokenWindowChunker {
            bpe,
            chunk_size,
            overlap,
        }
    }

    /// The configured window size in tokens.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The configured overlap in tokens.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Counts the tokens `text` encodes to.
    pub fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Splits `text` into overlapping token windows, decoded back to text.
    ///
    /// Returns an empty vector for empty input. Fails only if a window
    /// decodes to invalid UTF-8, which cannot happen for windows taken from a
    /// well-formed encoding of valid input text and would indicate tokenizer
    /// breakage.
    pub fn chunk(&self, text: &str) -> Result<Vec<String>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let tokens = self.bpe.encode_ordinary(text);
        let mut chunks = Vec::with_capacity(tokens.len() / self.stride() + 1);
        for (start, end) in token_windows(tokens.len(), self.chunk_size, self.stride()) {
            chunks.push(self.bpe.decode(tokens[start..end].to_vec())?);
        }
        Ok(chunks)
    }

    fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

impl Default for TokenWindowChunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

/// Yields `(start, end)` token ranges covering `0..len` with windows of
/// `size` tokens advancing by `stride`. The last window may be short.
fn token_windows(len: usize, size: usize, stride: usize) -> Vec<(usize, usize)> {
    let mut windows = Vec::new();
    let mut start = 0;
    while start < len {
        let end = (start + size).min(len);
        windows.push((start, end));
        if end == len {
            break;
        }
        start += stride;
    }
    windows
}
