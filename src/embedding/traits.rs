//! The seam between retrieval and whatever turns row descriptions into vectors.

use async_trait::async_trait;

use crate::error::Result;

/// Turns row descriptions and questions into vectors of one fixed width.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// One vector per text, same order as `texts`.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Expected vector width. Persisted indexes record the width they were built with.
    fn dimension(&self) -> usize;

    /// Identifies the model behind the vectors. Part of a saved index's fingerprint.
    fn model(&self) -> &str;

    /// Largest number of texts accepted by one `embed` call.
    fn max_batch_size(&self) -> usize {
        100
    }
}
