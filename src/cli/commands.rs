//! CLI command dispatcher.
//!
//! This module dispatches CLI commands to either local or remote execution.

use std::path::Path;

use anyhow::{bail, Result};
use demografi::{config::Config, plan::RawPlan};

use super::types::{AskResult, EvaluateResult, InspectResult, RetrieveResult};
use super::{local, output, remote};

/// Execution mode for CLI commands.
#[derive(Clone)]
pub enum ExecutionMode {
    /// Execute locally against the configured dataset
    Local(Box<Config>),
    /// Execute against a running server
    Remote(String),
}

/// Parse a plan given inline as JSON or as the path of a JSON file.
pub fn parse_plan_arg(arg: &str) -> Result<RawPlan> {
    let content = if Path::new(arg).is_file() {
        std::fs::read_to_string(arg)?
    } else {
        arg.to_string()
    };

    match serde_json::from_str(&content)? {
        serde_json::Value::Object(plan) => Ok(plan),
        other => bail!("Plan must be a JSON object, got: {}", other),
    }
}

/// Run the ask command.
pub async fn run_ask(mode: ExecutionMode, question: String, json_output: bool) -> Result<()> {
    let result: AskResult = match mode {
        ExecutionMode::Local(config) => local::ask(*config, question).await?,
        ExecutionMode::Remote(url) => remote::ask(&url, question).await?,
    };
    output::print_ask_result(&result, json_output);
    Ok(())
}

/// Run the evaluate command.
pub async fn run_evaluate(mode: ExecutionMode, plan: String, json_output: bool) -> Result<()> {
    let plan = parse_plan_arg(&plan)?;
    let result: EvaluateResult = match mode {
        ExecutionMode::Local(config) => local::evaluate(*config, plan).await?,
        ExecutionMode::Remote(url) => remote::evaluate(&url, plan).await?,
    };
    output::print_evaluate_result(&result, json_output);
    Ok(())
}

/// Run the retrieve command.
pub async fn run_retrieve(
    mode: ExecutionMode,
    query: String,
    top_k: Option<usize>,
    json_output: bool,
) -> Result<()> {
    let result: RetrieveResult = match mode {
        ExecutionMode::Local(config) => local::retrieve(*config, query, top_k).await?,
        ExecutionMode::Remote(url) => remote::retrieve(&url, query, top_k).await?,
    };
    output::print_retrieve_result(&result, json_output);
    Ok(())
}

/// Run the inspect command.
pub async fn run_inspect(
    mode: ExecutionMode,
    column: Option<String>,
    json_output: bool,
) -> Result<()> {
    let result: InspectResult = match mode {
        ExecutionMode::Local(config) => local::inspect(*config, column).await?,
        ExecutionMode::Remote(_) => {
            bail!("inspect reads the dataset directly and cannot run remotely")
        }
    };
    output::print_inspect_result(&result, json_output);
    Ok(())
}
