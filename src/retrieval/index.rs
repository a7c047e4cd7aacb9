//! Exact nearest-neighbour index over row embeddings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EmbeddingError, Result};

/// A match from [`FlatIndex::search`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexHit {
    /// Position of the vector, which is also the row index.
    pub id: usize,
    /// Squared Euclidean distance to the query.
    pub distance: f32,
}

/// Brute-force squared-L2 index. Vector `i` belongs to row `i`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatIndex {
    dimension: usize,
    /// Digest of the model and texts the vectors came from. Empty when unknown.
    #[serde(default)]
    fingerprint: String,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            fingerprint: String::new(),
            vectors: Vec::new(),
        }
    }

    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = fingerprint.into();
        self
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Build an index, checking every vector has the same dimension.
    pub fn from_vectors(dimension: usize, vectors: Vec<Vec<f32>>) -> Result<Self> {
        let mut index = Self::new(dimension);
        for vector in vectors {
            index.add(vector)?;
        }
        Ok(index)
    }

    pub fn add(&mut self, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                got: vector.len(),
            }
            .into());
        }
        self.vectors.push(vector);
        Ok(())
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The `k` nearest vectors, nearest first. Ties keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<IndexHit>> {
        if query.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                got: query.len(),
            }
            .into());
        }

        let mut hits: Vec<IndexHit> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(id, vector)| IndexHit {
                id,
                distance: squared_l2(query, vector),
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        Ok(hits)
    }

    /// Load a previously saved index. Every vector must have the recorded dimension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let index: Self = serde_json::from_str(&content)?;
        if let Some(bad) = index.vectors.iter().find(|v| v.len() != index.dimension) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: index.dimension,
                got: bad.len(),
            }
            .into());
        }
        Ok(index)
    }

    /// Persist the index as JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_vec(self)?)?;
        Ok(())
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
