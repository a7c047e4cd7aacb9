//! Cache of generated plans.
//!
//! Planning is the only step that calls out to a model, so repeated questions
//! are answered from here. Keys are normalized so that casing and spacing
//! differences hit the same entry.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::{Deserialize, Serialize};

use crate::config::CacheConfig;
use crate::metrics::get_metrics;
use crate::plan::RawPlan;

/// Normalized question text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanKey(String);

impl PlanKey {
    /// Lower-case the question and collapse runs of whitespace.
    pub fn new(question: &str) -> Self {
        let normalized = question
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plan cache backed by moka.
#[derive(Clone)]
pub struct PlanCache {
    plans: Cache<PlanKey, Arc<RawPlan>>,
    enabled: bool,
}

impl PlanCache {
    /// Create a new plan cache from configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let plans = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();

        Self {
            plans,
            enabled: config.enabled,
        }
    }

    /// Create a disabled cache.
    pub fn disabled() -> Self {
        Self {
            plans: Cache::builder().max_capacity(0).build(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get a cached plan.
    pub async fn get(&self, key: &PlanKey) -> Option<Arc<RawPlan>> {
        if !self.enabled {
            return None;
        }

        let result = self.plans.get(key).await;
        let metrics = get_metrics();

        if result.is_some() {
            metrics.cache_hits_total.inc();
            tracing::debug!(question = key.as_str(), "Plan cache hit");
        } else {
            metrics.cache_misses_total.inc();
        }

        result
    }

    /// Store a plan in the cache.
    pub async fn insert(&self, key: PlanKey, plan: RawPlan) {
        if !self.enabled {
            return;
        }

        self.plans.insert(key, Arc::new(plan)).await;
    }

    /// Invalidate all cache entries.
    pub fn invalidate_all(&self) {
        self.plans.invalidate_all();
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            enabled: self.enabled,
            entries: self.plans.entry_count(),
        }
    }

    /// Run cache maintenance (cleanup expired entries).
    pub async fn run_pending_tasks(&self) {
        self.plans.run_pending_tasks().await;
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub enabled: bool,
    /// Number of cached plans.
    pub entries: u64,
}
