//! Deterministic evaluation of validated plans against a snapshot.
//!
//! Evaluation is synchronous and allocation-local: the snapshot is only read,
//! so a single `Arc<DatasetSnapshot>` can serve any number of concurrent
//! requests.

mod aggregate;
mod mask;
mod result;

pub use aggregate::{aggregate, breakdown, total, Dimension, DIMENSION_ORDER};
pub use mask::{compile, select, Predicate, SelectionMask};
pub use result::{BreakdownGroup, GroupEntry, GroupKey, NumericKey, QueryAnswer};

use crate::dataset::DatasetSnapshot;
use crate::plan::{validate_plan, Plan, RawPlan, ValidatedPlan};

/// Evaluate a validated plan.
pub fn evaluate(snapshot: &DatasetSnapshot, plan: &Plan) -> QueryAnswer {
    let mask = select(snapshot, plan);
    aggregate(snapshot, &mask, plan)
}

/// Validate a raw plan and evaluate it, returning the validation result too.
pub fn evaluate_raw(snapshot: &DatasetSnapshot, raw: &RawPlan) -> (QueryAnswer, ValidatedPlan) {
    let validated = validate_plan(raw);
    let answer = evaluate(snapshot, &validated.plan);
    (answer, validated)
}
