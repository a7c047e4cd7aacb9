//! Plan generator trait.

use async_trait::async_trait;

use crate::plan::RawPlan;

/// Turns a free-text question into an untrusted plan mapping.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Generate a plan for `question`. The result still has to be validated.
    async fn generate(&self, question: &str) -> crate::error::Result<RawPlan>;

    /// Name used in logs and metrics.
    fn name(&self) -> &str;
}
