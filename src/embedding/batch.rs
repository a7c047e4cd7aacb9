//! Chunked, rate-limited embedding of the whole dataset.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use tracing::warn;

use crate::error::{DemografiError, EmbeddingError, Result};

use super::EmbeddingProvider;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Called with `(rows embedded so far, total rows)` after every chunk.
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// How the dataset is split and paced when embedding it.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Rows per provider call, capped by the provider's own limit
    pub batch_size: usize,
    /// Provider calls per second, 0 for unlimited
    pub requests_per_second: u32,
    /// Extra attempts per chunk before giving up
    pub max_retries: u32,
    /// Base delay between attempts; doubled per attempt when rate limited
    pub retry_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            requests_per_second: 0,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

impl BatchConfig {
    pub fn with_rate_limit(mut self, requests_per_second: u32) -> Self {
        self.requests_per_second = requests_per_second;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }
}

/// Wraps a provider so any number of rows can be embedded in one call.
pub struct BatchEmbeddingProcessor<P: EmbeddingProvider> {
    inner: P,
    limiter: Option<DirectLimiter>,
    chunk: usize,
    config: BatchConfig,
    on_progress: Option<ProgressCallback>,
}

impl<P: EmbeddingProvider> BatchEmbeddingProcessor<P> {
    pub fn new(inner: P, config: BatchConfig) -> Self {
        let limiter = NonZeroU32::new(config.requests_per_second)
            .map(|rps| RateLimiter::direct(Quota::per_second(rps)));
        let chunk = config.batch_size.clamp(1, inner.max_batch_size().max(1));

        Self {
            inner,
            limiter,
            chunk,
            config,
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Rows sent per provider call.
    pub fn chunk_size(&self) -> usize {
        self.chunk
    }

    async fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut attempt = 0u32;
        loop {
            if let Some(limiter) = &self.limiter {
                limiter.until_ready().await;
            }

            let error = match self.inner.embed(texts).await {
                Ok(vectors) => return Ok(vectors),
                Err(e) if attempt >= self.config.max_retries => return Err(e),
                Err(e) => e,
            };

            let delay = match error {
                DemografiError::Embedding(EmbeddingError::RateLimited) => {
                    self.config.retry_delay * 2u32.saturating_pow(attempt)
                }
                _ => self.config.retry_delay,
            };
            attempt += 1;
            warn!(
                model = self.inner.model(),
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Embedding chunk failed, retrying: {}",
                error
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl<P: EmbeddingProvider> EmbeddingProvider for BatchEmbeddingProcessor<P> {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.chunk) {
            vectors.extend(self.embed_chunk(chunk).await?);
            if let Some(callback) = &self.on_progress {
                callback(vectors.len(), texts.len());
            }
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    fn max_batch_size(&self) -> usize {
        usize::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts calls and fails the first `throttled` of them as rate limited.
    struct CountingProvider {
        calls: Arc<AtomicUsize>,
        throttled: usize,
    }

    impl CountingProvider {
        fn new(throttled: usize) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: calls.clone(),
                    throttled,
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl EmbeddingProvider for CountingProvider {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.throttled {
                return Err(EmbeddingError::RateLimited.into());
            }
            Ok(texts.iter().map(|t| vec![t.len() as f32]).collect())
        }

        fn dimension(&self) -> usize {
            1
        }

        fn model(&self) -> &str {
            "counting"
        }

        fn max_batch_size(&self) -> usize {
            10
        }
    }

    fn rows(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Negeri: Johor, Jumlah: {}", i)).collect()
    }

    fn quick() -> BatchConfig {
        BatchConfig::default().with_retries(3, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_rows_are_chunked_in_order() {
        let (provider, calls) = CountingProvider::new(0);
        let processor = BatchEmbeddingProcessor::new(provider, quick().with_batch_size(5));

        let texts = rows(12);
        let vectors = processor.embed(&texts).await.unwrap();
        assert_eq!(vectors.len(), 12);
        assert_eq!(vectors[11], vec![texts[11].len() as f32]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_rows_no_calls() {
        let (provider, calls) = CountingProvider::new(0);
        let processor = BatchEmbeddingProcessor::new(provider, quick());
        assert!(processor.embed(&[]).await.unwrap().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chunk_capped_by_provider() {
        let (provider, calls) = CountingProvider::new(0);
        let processor = BatchEmbeddingProcessor::new(provider, quick().with_batch_size(100));
        assert_eq!(processor.chunk_size(), 10);

        processor.embed(&rows(25)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_throttled_chunk_is_retried() {
        let (provider, calls) = CountingProvider::new(2);
        let processor = BatchEmbeddingProcessor::new(provider, quick());

        assert_eq!(processor.embed(&rows(1)).await.unwrap().len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let (provider, calls) = CountingProvider::new(10);
        let processor = BatchEmbeddingProcessor::new(
            provider,
            BatchConfig::default().with_retries(1, Duration::from_millis(1)),
        );

        let err = processor.embed(&rows(1)).await.unwrap_err();
        assert!(matches!(
            err,
            DemografiError::Embedding(EmbeddingError::RateLimited)
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_progress_reaches_total() {
        let seen = Arc::new(AtomicUsize::new(0));
        let sink = seen.clone();
        let (provider, _) = CountingProvider::new(0);
        let processor = BatchEmbeddingProcessor::new(provider, quick().with_batch_size(5))
            .with_progress(Box::new(move |done, total| {
                assert!(done <= total);
                sink.store(done, Ordering::SeqCst);
            }));

        processor.embed(&rows(12)).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 12);
    }

    #[test]
    fn test_model_passes_through() {
        let (provider, _) = CountingProvider::new(0);
        let processor = BatchEmbeddingProcessor::new(provider, BatchConfig::default());
        assert_eq!(processor.model(), "counting");
        assert_eq!(processor.dimension(), 1);
    }
}
