//! Row embeddings computed in-process with fastembed ONNX models.

use std::sync::Arc;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::sync::Mutex;

use crate::error::{EmbeddingError, Result};

use super::EmbeddingProvider;

/// Both supported models produce 384-wide vectors.
const LOCAL_DIMENSION: usize = 384;
const LOCAL_BATCH: usize = 32;

/// `embedding.model` values accepted with `provider = "local"`.
fn resolve_model(name: &str) -> Result<EmbeddingModel> {
    match name.rsplit('/').next().unwrap_or(name) {
        "all-MiniLM-L6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "multilingual-e5-small" => Ok(EmbeddingModel::MultilingualE5Small),
        _ => Err(EmbeddingError::ModelNotFound(format!(
            "{} (expected all-MiniLM-L6-v2 or multilingual-e5-small)",
            name
        ))
        .into()),
    }
}

/// Embeds row descriptions without leaving the process.
pub struct LocalEmbeddingProvider {
    model: Arc<Mutex<TextEmbedding>>,
    name: String,
}

impl LocalEmbeddingProvider {
    /// Load (downloading on first use) the named model.
    pub fn new(name: &str) -> Result<Self> {
        let options = InitOptions::new(resolve_model(name)?).with_show_download_progress(true);
        let model = TextEmbedding::try_new(options)
            .map_err(|e| EmbeddingError::ModelNotFound(format!("{}: {}", name, e)))?;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            name: name.to_string(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbeddingProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.len() > LOCAL_BATCH {
            return Err(EmbeddingError::BatchTooLarge(texts.len(), LOCAL_BATCH).into());
        }

        let texts = texts.to_vec();
        let model = self.model.clone();
        // ONNX inference blocks
        let embeddings = tokio::task::spawn_blocking(move || {
            #[allow(unused_mut)]
            let mut model = model.blocking_lock();
            model.embed(texts, None)
        })
        .await
        .map_err(|e| EmbeddingError::Api(format!("Embedding task failed: {}", e)))?
        .map_err(|e| EmbeddingError::Api(format!("Embedding failed: {}", e)))?;
        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        LOCAL_DIMENSION
    }

    fn model(&self) -> &str {
        &self.name
    }

    fn max_batch_size(&self) -> usize {
        LOCAL_BATCH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_model() {
        assert!(resolve_model("all-MiniLM-L6-v2").is_ok());
        assert!(resolve_model("sentence-transformers/all-MiniLM-L6-v2").is_ok());
        assert!(resolve_model("intfloat/multilingual-e5-small").is_ok());
        assert!(resolve_model("bge-small-en-v1.5").is_err());
    }

    #[tokio::test]
    #[ignore = "requires model download"]
    async fn test_embeds_row_descriptions() {
        let provider = LocalEmbeddingProvider::new("all-MiniLM-L6-v2").unwrap();
        let texts = vec![
            "Jantina: Lelaki, Umur: 20".to_string(),
            "Jantina: Perempuan, Umur: 40".to_string(),
        ];
        let embeddings = provider.embed(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].len(), provider.dimension());
    }
}
