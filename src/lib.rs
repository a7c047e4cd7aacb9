//! Demografi: natural-language questions over a population dataset.
//!
//! A question is turned into a filter plan by a language model, the plan is
//! validated into a fixed shape, and a deterministic engine evaluates it
//! against an in-memory snapshot of the dataset, returning a weighted total
//! plus breakdowns over every unconstrained dimension.

pub mod api;
pub mod cache;
pub mod config;
pub mod dataset;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod plan;
pub mod planner;
pub mod retrieval;
pub mod service;

pub use api::{create_router, run_server, ApiState};
pub use cache::{CacheStats, PlanCache, PlanKey};
pub use config::Config;
pub use dataset::{DatasetLoader, DatasetSnapshot, Record};
pub use engine::{evaluate, evaluate_raw, QueryAnswer};
pub use error::{DemografiError, Result};
pub use metrics::{get_metrics, Metrics, MetricsSnapshot};
pub use plan::{validate_plan, Plan, PlanDiagnostic, PlanField, RawPlan, ValidatedPlan};
pub use planner::{OpenAiPlanner, PlanGenerator};
pub use retrieval::ContextRetriever;
pub use service::{AskResponse, Assistant, EvaluateResponse};
