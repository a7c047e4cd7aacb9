//! Local execution against the configured dataset.

use anyhow::Result;
use demografi::{
    config::Config,
    dataset::{Column, DatasetLoader, DatasetSnapshot},
    plan::RawPlan,
    service::{build_retriever, Assistant},
};
use serde::{de::DeserializeOwned, Serialize};

use super::types::{AskResult, ColumnSummary, EvaluateResult, InspectResult, RetrieveResult};

fn load_snapshot(config: &Config) -> Result<DatasetSnapshot> {
    let loader = DatasetLoader::new(config.dataset.no_data_label.clone());
    Ok(loader.load_path(config.csv_path())?)
}

/// Re-read a service response through its wire shape.
fn to_view<S: Serialize, T: DeserializeOwned>(value: &S) -> Result<T> {
    Ok(serde_json::from_value(serde_json::to_value(value)?)?)
}

/// Answer a question with the configured plan generator.
pub async fn ask(config: Config, question: String) -> Result<AskResult> {
    let mut config = config;
    // A single question never needs row embeddings.
    config.retrieval.enabled = false;

    let assistant = Assistant::from_config(&config).await?;
    let response = assistant.ask(&question).await?;
    to_view(&response)
}

/// Evaluate a plan without calling the plan generator.
pub async fn evaluate(config: Config, plan: RawPlan) -> Result<EvaluateResult> {
    let snapshot = load_snapshot(&config)?;
    let validated = demografi::plan::validate_plan(&plan);
    let answer = demografi::engine::evaluate(&snapshot, &validated.plan);
    Ok(EvaluateResult {
        answer: to_view(&answer)?,
        diagnostics: validated.diagnostics,
    })
}

/// Retrieve the row descriptions nearest to a question.
pub async fn retrieve(
    config: Config,
    query: String,
    top_k: Option<usize>,
) -> Result<RetrieveResult> {
    let snapshot = load_snapshot(&config)?;
    let retriever = build_retriever(&config, &snapshot).await?;
    let results = retriever.retrieve(&query, top_k).await?;
    Ok(RetrieveResult { results })
}

/// Summarize the loaded dataset.
pub async fn inspect(config: Config, column: Option<String>) -> Result<InspectResult> {
    let snapshot = load_snapshot(&config)?;

    let columns = Column::REQUIRED
        .iter()
        .copied()
        .filter(|c| c.is_categorical())
        .filter(|c| column.as_deref().map_or(true, |name| c.name() == name))
        .map(|c| ColumnSummary {
            column: c.name().to_string(),
            distinct: snapshot
                .distinct_values(c)
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
        .collect::<Vec<_>>();

    if let Some(name) = &column {
        if columns.is_empty() {
            anyhow::bail!("Unknown categorical column: {}", name);
        }
    }

    Ok(InspectResult {
        csv_path: config.csv_path().display().to_string(),
        records: snapshot.len(),
        total_weight: snapshot.total_weight(),
        columns,
    })
}
