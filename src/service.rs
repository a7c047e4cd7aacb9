//! Question answering: plan generation, validation, evaluation and retrieval
//! wired together behind one shared handle.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::cache::{PlanCache, PlanKey};
use crate::config::Config;
use crate::dataset::{DatasetLoader, DatasetSnapshot};
use crate::embedding::{create_batch_processor, BatchConfig};
use crate::engine::{evaluate, QueryAnswer};
use crate::error::{PlannerError, Result, RetrievalError};
use crate::metrics::{get_metrics, Metrics};
use crate::plan::{validate_plan, PlanDiagnostic, RawPlan, ValidatedPlan};
use crate::planner::{OpenAiPlanner, PlanGenerator};
use crate::retrieval::ContextRetriever;

/// Answer to a natural-language question.
#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    /// Plan as produced by the generator, before validation.
    pub plan: RawPlan,
    pub answer: QueryAnswer,
    pub diagnostics: Vec<PlanDiagnostic>,
}

/// Answer to a caller-supplied plan.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluateResponse {
    pub answer: QueryAnswer,
    pub diagnostics: Vec<PlanDiagnostic>,
}

/// Shared question-answering service.
pub struct Assistant {
    snapshot: Arc<DatasetSnapshot>,
    planner: Arc<dyn PlanGenerator>,
    cache: PlanCache,
    retriever: Option<Arc<ContextRetriever>>,
}

impl Assistant {
    /// Create an assistant with no plan cache and no retrieval.
    pub fn new(snapshot: Arc<DatasetSnapshot>, planner: Arc<dyn PlanGenerator>) -> Self {
        get_metrics().records_loaded.set(snapshot.len() as i64);
        Self {
            snapshot,
            planner,
            cache: PlanCache::disabled(),
            retriever: None,
        }
    }

    pub fn with_cache(mut self, cache: PlanCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_retriever(mut self, retriever: Arc<ContextRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Load the dataset and build every component named by the configuration.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let loader = DatasetLoader::new(config.dataset.no_data_label.clone());
        let snapshot = Arc::new(loader.load_path(config.csv_path())?);

        let planner = OpenAiPlanner::from_config(&config.planner)?;
        info!(model = planner.model(), "Plan generator ready");

        let mut assistant = Self::new(snapshot.clone(), Arc::new(planner))
            .with_cache(PlanCache::new(&config.cache));

        if config.retrieval.enabled {
            let retriever = build_retriever(config, &snapshot).await?;
            assistant = assistant.with_retriever(Arc::new(retriever));
        }

        Ok(assistant)
    }

    pub fn snapshot(&self) -> &Arc<DatasetSnapshot> {
        &self.snapshot
    }

    pub fn records(&self) -> usize {
        self.snapshot.len()
    }

    pub fn planner_name(&self) -> &str {
        self.planner.name()
    }

    pub fn retrieval_enabled(&self) -> bool {
        self.retriever.is_some()
    }

    pub fn cache(&self) -> &PlanCache {
        &self.cache
    }

    /// Turn a question into a plan and evaluate it.
    pub async fn ask(&self, question: &str) -> Result<AskResponse> {
        let metrics = get_metrics();
        metrics.ask_requests_total.inc();

        if question.trim().is_empty() {
            metrics.ask_errors_total.inc();
            return Err(PlannerError::EmptyQuestion.into());
        }

        let plan = match self.plan_for(question).await {
            Ok(plan) => plan,
            Err(e) => {
                metrics.ask_errors_total.inc();
                metrics.planner_errors_total.inc();
                error!(planner = self.planner.name(), "Plan generation failed: {}", e);
                return Err(e);
            }
        };

        let EvaluateResponse {
            answer,
            diagnostics,
        } = self
            .evaluate_offloaded(plan.clone())
            .await
            .inspect_err(|_| metrics.ask_errors_total.inc())?;

        Ok(AskResponse {
            plan,
            answer,
            diagnostics,
        })
    }

    /// Validate and evaluate a plan supplied directly by the caller.
    pub fn evaluate(&self, raw: &RawPlan) -> EvaluateResponse {
        evaluate_on(&self.snapshot, raw)
    }

    /// [`Self::evaluate`] on the blocking pool, so a full scan of a large
    /// snapshot does not occupy a runtime worker.
    pub async fn evaluate_offloaded(&self, raw: RawPlan) -> Result<EvaluateResponse> {
        let snapshot = Arc::clone(&self.snapshot);
        let response = tokio::task::spawn_blocking(move || evaluate_on(&snapshot, &raw))
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        Ok(response)
    }

    /// Row descriptions nearest to `query`.
    pub async fn retrieve(&self, query: &str, top_k: Option<usize>) -> Result<Vec<String>> {
        let metrics = get_metrics();
        metrics.retrieval_requests_total.inc();

        let Some(retriever) = &self.retriever else {
            metrics.retrieval_errors_total.inc();
            return Err(RetrievalError::Disabled.into());
        };

        let _timer = Metrics::start_timer(&metrics.retrieval_duration_seconds);
        retriever.retrieve(query, top_k).await.inspect_err(|e| {
            metrics.retrieval_errors_total.inc();
            error!("Retrieval failed: {}", e);
        })
    }

    async fn plan_for(&self, question: &str) -> Result<RawPlan> {
        let key = PlanKey::new(question);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached.as_ref().clone());
        }

        let plan = {
            let _timer = Metrics::start_timer(&get_metrics().planner_duration_seconds);
            self.planner.generate(question).await?
        };
        self.cache.insert(key, plan.clone()).await;
        Ok(plan)
    }
}

fn evaluate_on(snapshot: &DatasetSnapshot, raw: &RawPlan) -> EvaluateResponse {
    let metrics = get_metrics();
    let _timer = Metrics::start_timer(&metrics.evaluation_duration_seconds);

    let ValidatedPlan { plan, diagnostics } = validate_plan(raw);
    metrics
        .plan_diagnostics_total
        .inc_by(diagnostics.len() as u64);

    let answer = evaluate(snapshot, &plan);
    metrics.evaluations_total.inc();

    EvaluateResponse {
        answer,
        diagnostics,
    }
}

/// Embed every row of the snapshot, reusing the persisted index when it is current.
pub async fn build_retriever(
    config: &Config,
    snapshot: &DatasetSnapshot,
) -> Result<ContextRetriever> {
    let embedder = create_batch_processor(&config.embedding, BatchConfig::default())?;
    let texts = snapshot.row_texts();
    if texts.is_empty() {
        warn!("Dataset is empty, retrieval will return no rows");
    }
    ContextRetriever::load_or_build(
        embedder,
        texts,
        &config.index_path(),
        config.retrieval.top_k,
    )
    .await
}
