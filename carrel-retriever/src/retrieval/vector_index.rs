//! Exact k-nearest-neighbor index over embedding vectors.
//!
//! One [`VectorIndex`] covers one workspace. Vectors are stored densely in a
//! flat row-major buffer and searched by brute force under squared-Euclidean
//! distance. That is deliberate: workspace corpora are single-user document
//! sets, small enough that exact search is cheap, and an approximate index
//! would trade recall for speed nobody needs at this scale.
//!
//! The index is rebuilt wholesale on every reindex and treated as immutable
//! once built, so there is no incremental update API.
//!
//! ## Serialized format
//!
//! ```text
//! magic   b"CRVI"            4 bytes
//! version u32                currently 1
//! count   u32                number of vectors
//! dim     u32                vector dimension
//! data    count * dim * f32  row-major vector data
//! ```
//!
//! Integers and floats are host-endian (written via [`bytemuck`] casts); the
//! file is a local cache regenerated on reindex, not an interchange format.

use crate::error::{Result, RetrieverError};
use std::path::Path;

const INDEX_MAGIC: &[u8; 4] = b"CRVI";
const INDEX_VERSION: u32 = 1;

/// Brute-force nearest-neighbor index over fixed-dimension vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    dimension: usize,
    // Row-major: vector `i` occupies `data[i * dimension .. (i + 1) * dimension]`.
    data: Vec<f32>,
}

impl VectorIndex {
    /// Build a fresh index from an ordered list of vectors.
    ///
    /// The dimension is established by the first vector; any later vector of
    /// a different length fails with
    /// [`RetrieverError::DimensionMismatch`]. An empty input produces an
    /// empty index, which is constructible but not searchable.
    pub fn build(vectors: &[Vec<f32>]) -> Result<Self> {
        let dimension = vectors.first().map(|v| v.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(vectors.len() * dimension);
        for vector in vectors {
            if vector.len() != dimension {
                return Err(RetrieverError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            data.extend_from_slice(vector);
        }
        Ok(VectorIndex { dimension, data })
    }

    /// Number of vectors in the index.
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Dimension of the stored vectors (0 for an empty index).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Find the `k` nearest vectors to `query` under squared-Euclidean
    /// distance.
    ///
    /// Returns `(position, distance)` pairs in ascending distance order, ties
    /// broken by ascending position. Returns fewer than `k` results when the
    /// index holds fewer than `k` vectors. Fails with
    /// [`RetrieverError::EmptyIndex`] on an empty index and
    /// [`RetrieverError::DimensionMismatch`] on a wrong-length query.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if self.is_empty() {
            return Err(RetrieverError::EmptyIndex);
        }
        if query.len() != self.dimension {
            return Err(RetrieverError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut hits: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, vector)| (position, squared_l2(query, vector)))
            .collect();
        hits.sort_unstable_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        hits.truncate(k);
        Ok(hits)
    }

    /// Serialize the index into its binary representation.
    pub fn to_bytes(&self) -> Vec<u8> {
        let header = [INDEX_VERSION, self.len() as u32, self.dimension as u32];
        let mut bytes = Vec::with_capacity(16 + self.data.len() * 4);
        bytes.extend_from_slice(INDEX_MAGIC);
        bytes.extend_from_slice(bytemuck::cast_slice(&header));
        bytes.extend_from_slice(bytemuck::cast_slice(&self.data));
        bytes
    }

    /// Reconstruct an index from bytes produced by [`VectorIndex::to_bytes`].
    ///
    /// Fails with [`RetrieverError::CorruptIndex`] on any structural problem:
    /// wrong magic, unknown version, or a data section whose length disagrees
    /// with the header.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 16 {
            return Err(RetrieverError::corrupt_index("file shorter than header"));
        }
        let (magic, rest) = bytes.split_at(4);
        if magic != INDEX_MAGIC {
            return Err(RetrieverError::corrupt_index("bad magic"));
        }
        let (header_bytes, data_bytes) = rest.split_at(12);
        let header: Vec<u32> = bytemuck::pod_collect_to_vec(header_bytes);
        let (version, count, dimension) = (header[0], header[1] as usize, header[2] as usize);
        if version != INDEX_VERSION {
            return Err(RetrieverError::corrupt_index(format!(
                "unsupported index version {version}"
            )));
        }
        if data_bytes.len() != count * dimension * std::mem::size_of::<f32>() {
            return Err(RetrieverError::corrupt_index(format!(
                "expected {count} x {dimension} vectors, found {} data bytes",
                data_bytes.len()
            )));
        }
        let data: Vec<f32> = bytemuck::pod_collect_to_vec(data_bytes);
        Ok(VectorIndex { dimension, data })
    }

    /// Write the serialized index to `path`.
    pub async fn save(&self, path: &Path) -> Result<()> {
        tokio::fs::write(path, self.to_bytes()).await?;
        Ok(())
    }

    /// Read an index back from `path`.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_bytes(&bytes)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
