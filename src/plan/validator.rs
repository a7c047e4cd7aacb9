//! Coerces untrusted plan mappings into a fixed-shape [`Plan`].

use serde_json::Value;
use tracing::{debug, warn};

use super::types::{
    recognized_keys, AgeBound, Plan, PlanDiagnostic, RawPlan, ValidatedPlan, ANY, FIELD_BINDINGS,
};

/// Validate a raw plan. Never fails: bad values fall back to "Any" with a diagnostic.
pub fn validate_plan(raw: &RawPlan) -> ValidatedPlan {
    let mut plan = Plan::any();
    let mut diagnostics = Vec::new();

    for binding in &FIELD_BINDINGS {
        match raw.get(binding.plan_key) {
            None | Some(Value::Null) => {}
            Some(Value::String(value)) => plan.set(binding.field, value.as_str()),
            Some(other) => diagnostics.push(PlanDiagnostic::UnexpectedType {
                key: binding.plan_key.to_string(),
                found: json_type_name(other).to_string(),
            }),
        }
    }

    for bound in AgeBound::ALL {
        let parsed = match raw.get(bound.plan_key()) {
            None | Some(Value::Null) => None,
            Some(value) => match parse_age_bound(value) {
                Ok(age) => age,
                Err(diagnostic) => {
                    diagnostics.push(diagnostic.for_key(bound.plan_key()));
                    None
                }
            },
        };
        match bound {
            AgeBound::Min => plan.umur_min = parsed,
            AgeBound::Max => plan.umur_max = parsed,
        }
    }

    for key in raw.keys() {
        if !recognized_keys().any(|known| known == key.as_str()) {
            debug!(key = %key, "Ignoring unrecognized plan key");
        }
    }

    for diagnostic in &diagnostics {
        warn!(key = diagnostic.key(), "{}", diagnostic);
    }

    ValidatedPlan { plan, diagnostics }
}

/// Failure to read an age bound, before the key is attached.
enum BoundError {
    NotInteger(String),
    WrongType(&'static str),
}

impl BoundError {
    fn for_key(self, key: &str) -> PlanDiagnostic {
        match self {
            Self::NotInteger(value) => PlanDiagnostic::InvalidAgeBound {
                key: key.to_string(),
                value,
            },
            Self::WrongType(found) => PlanDiagnostic::UnexpectedType {
                key: key.to_string(),
                found: found.to_string(),
            },
        }
    }
}

/// `Ok(None)` is "Any".
fn parse_age_bound(value: &Value) -> Result<Option<i64>, BoundError> {
    match value {
        Value::String(s) if s == ANY => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| BoundError::NotInteger(s.clone())),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| BoundError::NotInteger(n.to_string())),
        other => Err(BoundError::WrongType(json_type_name(other))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
