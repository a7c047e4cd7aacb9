//! Semantic retrieval of row descriptions.

use std::path::Path;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::embedding::EmbeddingProvider;
use crate::error::{Result, RetrievalError};

use super::index::FlatIndex;

/// Returns the row descriptions closest to a question.
pub struct ContextRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: FlatIndex,
    texts: Vec<String>,
    default_top_k: usize,
}

impl ContextRetriever {
    /// Embed every text and index the result.
    pub async fn build(
        embedder: Arc<dyn EmbeddingProvider>,
        texts: Vec<String>,
        default_top_k: usize,
    ) -> Result<Self> {
        let embeddings = embedder.embed(&texts).await?;
        if embeddings.len() != texts.len() {
            return Err(RetrievalError::SizeMismatch {
                index: embeddings.len(),
                texts: texts.len(),
            }
            .into());
        }

        let dimension = embeddings
            .first()
            .map(Vec::len)
            .unwrap_or_else(|| embedder.dimension());
        let index = FlatIndex::from_vectors(dimension, embeddings)?
            .with_fingerprint(fingerprint(embedder.model(), &texts));
        info!(rows = index.len(), dimension, model = embedder.model(), "Row embeddings indexed");

        Ok(Self {
            embedder,
            index,
            texts,
            default_top_k,
        })
    }

    /// Reuse the index at `path` when it was built by the same model from the same texts,
    /// otherwise rebuild and save it.
    pub async fn load_or_build(
        embedder: Arc<dyn EmbeddingProvider>,
        texts: Vec<String>,
        path: &Path,
        default_top_k: usize,
    ) -> Result<Self> {
        if path.is_file() {
            let expected = fingerprint(embedder.model(), &texts);
            match FlatIndex::load(path) {
                Ok(index) if index.fingerprint() == expected && index.len() == texts.len() => {
                    info!(
                        path = %path.display(),
                        rows = index.len(),
                        dimension = index.dimension(),
                        "Loaded row embeddings"
                    );
                    return Self::from_index(embedder, index, texts, default_top_k);
                }
                Ok(index) => info!(
                    path = %path.display(),
                    rows = index.len(),
                    expected = texts.len(),
                    "Stored row embeddings do not match the dataset or model, rebuilding"
                ),
                Err(e) => warn!(path = %path.display(), "Failed to read row embeddings: {}", e),
            }
        }

        let retriever = Self::build(embedder, texts, default_top_k).await?;
        if let Err(e) = retriever.index.save(path) {
            warn!(path = %path.display(), "Failed to save row embeddings: {}", e);
        }
        Ok(retriever)
    }

    /// Wrap an existing index. Its size must match `texts`.
    pub fn from_index(
        embedder: Arc<dyn EmbeddingProvider>,
        index: FlatIndex,
        texts: Vec<String>,
        default_top_k: usize,
    ) -> Result<Self> {
        if index.len() != texts.len() {
            return Err(RetrievalError::SizeMismatch {
                index: index.len(),
                texts: texts.len(),
            }
            .into());
        }
        Ok(Self {
            embedder,
            index,
            texts,
            default_top_k,
        })
    }

    /// Texts of the `top_k` nearest rows (default when `None`), nearest first.
    pub async fn retrieve(&self, query: &str, top_k: Option<usize>) -> Result<Vec<String>> {
        let k = top_k.unwrap_or(self.default_top_k);
        let query_embedding = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or(RetrievalError::EmptyQueryEmbedding)?;

        let hits = self.index.search(&query_embedding, k)?;
        Ok(hits
            .into_iter()
            .filter_map(|hit| self.texts.get(hit.id).cloned())
            .collect())
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }
}

/// SHA-256 over the model name and every row text, length-prefixed.
pub fn fingerprint(model: &str, texts: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    hasher.update([0u8]);
    for text in texts {
        hasher.update((text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
