//! Row embeddings from an OpenAI-compatible `/embeddings` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ApiEmbeddingConfig;
use crate::error::{EmbeddingError, Result};

use super::EmbeddingProvider;

/// Embeds row descriptions through a hosted embedding model.
pub struct ApiEmbeddingProvider {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    dimension: usize,
    max_batch_size: usize,
}

#[derive(Serialize)]
struct EmbeddingsBody<'a> {
    model: &'a str,
    input: &'a [String],
    encoding_format: &'static str,
}

#[derive(Deserialize)]
struct EmbeddingsReply {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct FailureReply {
    error: FailureDetail,
}

#[derive(Deserialize)]
struct FailureDetail {
    message: String,
}

impl ApiEmbeddingProvider {
    /// Build from `[embedding.api]`. The key falls back to `OPENAI_API_KEY`.
    pub fn from_config(config: &ApiEmbeddingConfig) -> Result<Self> {
        let api_key = match &config.api_key {
            Some(key) => key.clone(),
            None => std::env::var("OPENAI_API_KEY").map_err(|_| {
                EmbeddingError::Api(
                    "no embedding.api.api_key configured and OPENAI_API_KEY is unset".to_string(),
                )
            })?,
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key,
            dimension: config.dimension,
            max_batch_size: config.batch_size.max(1),
        })
    }

    async fn post_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = EmbeddingsBody {
            model: &self.model,
            input: texts,
            encoding_format: "float",
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbeddingError::Api(format!("Embedding request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(EmbeddingError::RateLimited.into());
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<FailureReply>(&text)
                .map(|reply| reply.error.message)
                .unwrap_or(text);
            return Err(EmbeddingError::Api(format!("API error ({}): {}", status, message)).into());
        }

        let reply: EmbeddingsReply = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Api(format!("Failed to parse response: {}", e)))?;
        order_by_input(reply.data, texts.len())
    }
}

/// Items may come back in any order; `index` points at the input text.
fn order_by_input(mut items: Vec<EmbeddingItem>, expected: usize) -> Result<Vec<Vec<f32>>> {
    if items.len() != expected {
        return Err(EmbeddingError::Api(format!(
            "Expected {} embeddings, got {}",
            expected,
            items.len()
        ))
        .into());
    }
    items.sort_by_key(|item| item.index);
    Ok(items.into_iter().map(|item| item.embedding).collect())
}

#[async_trait]
impl EmbeddingProvider for ApiEmbeddingProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.len() > self.max_batch_size {
            return Err(EmbeddingError::BatchTooLarge(texts.len(), self.max_batch_size).into());
        }

        debug!(model = %self.model, texts = texts.len(), "Requesting embeddings");
        self.post_batch(texts).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }
}
