//! Vectors for row descriptions and questions, used by retrieval.
//!
//! [`create_batch_processor`] picks the provider named by `[embedding]` and
//! wraps it in a [`BatchEmbeddingProcessor`] so the whole dataset can be
//! embedded in one call.

mod api;
mod batch;
#[cfg(feature = "local-embeddings")]
mod local;
mod traits;

pub use api::ApiEmbeddingProvider;
pub use batch::{BatchConfig, BatchEmbeddingProcessor, ProgressCallback};
#[cfg(feature = "local-embeddings")]
pub use local::LocalEmbeddingProvider;
pub use traits::EmbeddingProvider;

use std::sync::Arc;

use crate::config::{EmbeddingConfig, EmbeddingProvider as EmbeddingProviderType};
use crate::error::Result;

fn log_progress() -> ProgressCallback {
    Box::new(|processed: usize, total: usize| {
        tracing::debug!(processed, total, "Embedded row batch");
    })
}

/// Create a batch-processing embedder from configuration.
pub fn create_batch_processor(
    config: &EmbeddingConfig,
    batch_config: BatchConfig,
) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider {
        #[cfg(feature = "local-embeddings")]
        EmbeddingProviderType::Local => {
            let provider = LocalEmbeddingProvider::new(&config.model)?;
            let processor =
                BatchEmbeddingProcessor::new(provider, batch_config).with_progress(log_progress());
            Ok(Arc::new(processor))
        }
        #[cfg(not(feature = "local-embeddings"))]
        EmbeddingProviderType::Local => Err(crate::error::ConfigError::Invalid(
            "embedding.provider = \"local\" requires the local-embeddings feature".to_string(),
        )
        .into()),
        EmbeddingProviderType::Api => {
            let provider = ApiEmbeddingProvider::from_config(&config.api)?;
            // APIs get a conservative default rate limit
            let batch_config = if batch_config.requests_per_second == 0 {
                batch_config.with_rate_limit(10)
            } else {
                batch_config
            };
            let batch_config = batch_config.with_batch_size(config.api.batch_size);
            let processor =
                BatchEmbeddingProcessor::new(provider, batch_config).with_progress(log_progress());
            Ok(Arc::new(processor))
        }
    }
}
