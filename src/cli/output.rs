//! Output formatting for CLI commands.
//!
//! This module handles formatting output as either JSON or human-readable text.

use serde::Serialize;
use serde_json::Value;

use super::types::{AnswerView, AskResult, EvaluateResult, InspectResult, RetrieveResult};

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

/// Render a JSON scalar without quotes.
fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn print_answer(answer: &AnswerView) {
    println!("Total: {}", answer.total);

    if answer.groups.is_empty() {
        return;
    }

    for group in &answer.groups {
        println!("\n{:<40} {:>12}", group.label.to_uppercase(), "COUNT");
        println!("{}", "-".repeat(53));
        for entry in &group.data {
            let key = entry.get(&group.label).map(plain).unwrap_or_default();
            let count = entry.get("COUNT").map(plain).unwrap_or_default();
            let key = if key.chars().count() > 38 {
                format!("{}...", key.chars().take(35).collect::<String>())
            } else {
                key
            };
            println!("{:<40} {:>12}", key, count);
        }
    }
}

fn print_diagnostics(diagnostics: &[demografi::plan::PlanDiagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    println!("\nWarnings:");
    for diagnostic in diagnostics {
        println!("  - {}", diagnostic);
    }
}

/// Print the answer to a question.
pub fn print_ask_result(result: &AskResult, json: bool) {
    if json {
        print_json(result);
    } else {
        let constraints: Vec<String> = result
            .plan
            .iter()
            .filter(|(_, value)| value.as_str() != Some(demografi::plan::ANY))
            .map(|(key, value)| format!("{}={}", key, plain(value)))
            .collect();

        if constraints.is_empty() {
            println!("Plan: (no constraints)");
        } else {
            println!("Plan: {}", constraints.join(", "));
        }
        print_diagnostics(&result.diagnostics);
        println!();
        print_answer(&result.answer);
    }
}

/// Print the result of evaluating a plan.
pub fn print_evaluate_result(result: &EvaluateResult, json: bool) {
    if json {
        print_json(result);
    } else {
        print_answer(&result.answer);
        print_diagnostics(&result.diagnostics);
    }
}

/// Print retrieved row descriptions.
pub fn print_retrieve_result(result: &RetrieveResult, json: bool) {
    if json {
        print_json(result);
    } else {
        if result.results.is_empty() {
            println!("No rows found.");
            return;
        }

        for (i, text) in result.results.iter().enumerate() {
            println!("{}. {}", i + 1, text);
        }
    }
}

/// Print a dataset summary.
pub fn print_inspect_result(result: &InspectResult, json: bool) {
    if json {
        print_json(result);
    } else {
        println!("Dataset: {}", result.csv_path);
        println!("Records: {}", result.records);
        println!("Total weight: {}", demografi::dataset::format_number(result.total_weight));

        for column in &result.columns {
            println!("\n{} ({} values)", column.column, column.distinct.len());
            for value in &column.distinct {
                println!("  {}", value);
            }
        }
    }
}
