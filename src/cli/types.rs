//! CLI response types.
//!
//! Local and remote execution both produce these, so answers are held in
//! their wire shape rather than as engine types.

use demografi::plan::PlanDiagnostic;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of the `ask` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResult {
    pub plan: Map<String, Value>,
    pub answer: AnswerView,
    #[serde(default)]
    pub diagnostics: Vec<PlanDiagnostic>,
}

/// Result of the `evaluate` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResult {
    pub answer: AnswerView,
    #[serde(default)]
    pub diagnostics: Vec<PlanDiagnostic>,
}

/// Result of the `retrieve` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveResult {
    pub results: Vec<String>,
}

/// Total plus breakdowns, as serialized on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerView {
    pub total: u64,
    pub groups: Vec<GroupView>,
}

/// One breakdown. Each entry maps the group label to a key and `COUNT` to a weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupView {
    pub label: String,
    pub data: Vec<Map<String, Value>>,
}

/// Result of the `inspect` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectResult {
    pub csv_path: String,
    pub records: usize,
    pub total_weight: f64,
    pub columns: Vec<ColumnSummary>,
}

/// Distinct values of one categorical column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    pub distinct: Vec<String>,
}
