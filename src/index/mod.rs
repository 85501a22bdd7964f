//! Flat in-memory vector index with exact nearest-neighbor search.
//!
//! Vectors are stored in one contiguous buffer and scanned linearly with
//! squared L2 distance. The index is built once per corpus load and never
//! mutated; any corpus change requires a full rebuild. Memory cost is
//! O(num_vectors * dim).

use crate::errors::{AssistantError, Result};

/// A nearest-neighbor hit: the vector's ordinal and its distance to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub ordinal: usize,
    pub distance: f32,
}

/// Exact (brute-force) L2 similarity index
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dim: usize,
    // row-major: vector i occupies data[i * dim .. (i + 1) * dim]
    data: Vec<f32>,
    len: usize,
}

impl FlatIndex {
    /// Build an index from per-passage embedding vectors.
    ///
    /// Fails on an empty vector set and on any dimensionality mismatch:
    /// every vector must have the width of the first.
    pub fn from_vectors(vectors: Vec<Vec<f32>>) -> Result<Self> {
        if vectors.is_empty() {
            return Err(AssistantError::EmptyCorpus);
        }

        let dim = vectors[0].len();
        if dim == 0 {
            return Err(AssistantError::Retrieval(
                "embedding model produced zero-width vectors".to_string(),
            ));
        }

        let mut data = Vec::with_capacity(vectors.len() * dim);
        for (i, vector) in vectors.iter().enumerate() {
            if vector.len() != dim {
                return Err(AssistantError::Retrieval(format!(
                    "embedding dimension mismatch at passage {}: expected {}, got {}",
                    i,
                    dim,
                    vector.len()
                )));
            }
            data.extend_from_slice(vector);
        }

        let len = vectors.len();
        Ok(Self { dim, data, len })
    }

    /// Number of indexed vectors
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Embedding dimensionality of this index instance
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Exact k-nearest-neighbor search by squared L2 distance.
    ///
    /// Returns at most `min(k, len)` neighbors in ascending distance order;
    /// equal distances are broken by ordinal so results are deterministic.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dim {
            return Err(AssistantError::Retrieval(format!(
                "query dimension mismatch: expected {}, got {}",
                self.dim,
                query.len()
            )));
        }

        let mut neighbors: Vec<Neighbor> = (0..self.len)
            .map(|ordinal| {
                let row = &self.data[ordinal * self.dim..(ordinal + 1) * self.dim];
                Neighbor {
                    ordinal,
                    distance: squared_l2(query, row),
                }
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.ordinal.cmp(&b.ordinal))
        });
        neighbors.truncate(k);

        Ok(neighbors)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
