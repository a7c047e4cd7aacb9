//! Evaluation properties over the CSV fixture.

use serde_json::json;

use demografi::engine::{evaluate, evaluate_raw, QueryAnswer};
use demografi::plan::{validate_plan, Plan, PlanField};

use crate::common::{raw, snapshot};

const ALL_LABELS: [&str; 8] = [
    "Negeri",
    "Daerah",
    "Jantina",
    "Etnik",
    "Umur",
    "Status OKU",
    "Pekerjaan Utama",
    "Pendidikan Tertinggi",
];

#[test]
fn test_unconstrained_plan_selects_everything() {
    let snapshot = snapshot();
    let all_any = raw(json!({
        "negeri": "Any", "daerah": "Any", "jantina": "Any", "umur_min": "Any",
        "umur_max": "Any", "etnik": "Any", "status_oku": "Any",
        "pekerjaan_utama": "Any", "pendidikan_tertinggi": "Any"
    }));

    let (answer, validated) = evaluate_raw(&snapshot, &all_any);
    assert!(validated.plan.is_unconstrained());
    assert_eq!(answer.total, snapshot.total_weight() as u64);
    assert_eq!(answer.total, 26);
    assert_eq!(answer.labels(), ALL_LABELS);

    let negeri = answer.group("Negeri").unwrap();
    assert_eq!(negeri.count_for("Johor"), Some(8.0));
    assert_eq!(negeri.count_for("Pahang"), Some(9.0));
    assert_eq!(negeri.count_for("Perak"), Some(9.5));
}

#[test]
fn test_empty_plan_matches_all_any() {
    let snapshot = snapshot();
    let (from_empty, _) = evaluate_raw(&snapshot, &raw(json!({})));
    assert_eq!(from_empty, evaluate(&snapshot, &Plan::any()));
}

#[test]
fn test_evaluation_is_idempotent() {
    let snapshot = snapshot();
    let plan = raw(json!({"jantina": "Perempuan", "umur_min": "30"}));

    let (first, _) = evaluate_raw(&snapshot, &plan);
    let (second, _) = evaluate_raw(&snapshot, &plan);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_adding_constraints_never_increases_total() {
    let snapshot = snapshot();
    let steps = [
        json!({}),
        json!({"negeri": "Perak"}),
        json!({"negeri": "Perak", "jantina": "Perempuan"}),
        json!({"negeri": "Perak", "jantina": "Perempuan", "umur_min": "60"}),
        json!({"negeri": "Perak", "jantina": "Perempuan", "umur_min": "60", "status_oku": "Bukan OKU"}),
    ];

    let totals: Vec<u64> = steps
        .iter()
        .map(|plan| evaluate_raw(&snapshot, &raw(plan.clone())).0.total)
        .collect();
    assert_eq!(totals, vec![26, 9, 7, 7, 0]);
    assert!(totals.windows(2).all(|pair| pair[1] <= pair[0]));
}

#[test]
fn test_constrained_dimensions_are_not_broken_down() {
    let snapshot = snapshot();
    let (answer, _) = evaluate_raw(&snapshot, &raw(json!({"negeri": "Johor", "etnik": "Melayu"})));

    assert_eq!(answer.total, 5);
    let labels = answer.labels();
    assert!(!labels.contains(&"Negeri"));
    assert!(!labels.contains(&"Etnik"));
    for label in ["Daerah", "Jantina", "Umur", "Status OKU"] {
        assert_eq!(labels.iter().filter(|l| **l == label).count(), 1);
    }
}

#[test]
fn test_age_group_only_when_both_bounds_open() {
    let snapshot = snapshot();
    for plan in [
        json!({"umur_min": "18"}),
        json!({"umur_max": "64"}),
        json!({"umur_min": "18", "umur_max": "64"}),
    ] {
        let (answer, _) = evaluate_raw(&snapshot, &raw(plan));
        assert!(answer.group("Umur").is_none());
    }

    let (answer, _) = evaluate_raw(&snapshot, &raw(json!({"umur_min": "Any"})));
    let ages: Vec<String> = answer
        .group("Umur")
        .unwrap()
        .keys()
        .map(|k| k.to_string())
        .collect();
    assert_eq!(ages, vec!["17", "20", "35", "40", "67"]);
}

#[test]
fn test_unknown_value_gives_empty_answer() {
    let snapshot = snapshot();
    let (answer, _) = evaluate_raw(&snapshot, &raw(json!({"negeri": "Mars"})));
    assert_eq!(answer, QueryAnswer::empty());
    assert_eq!(
        serde_json::to_value(&answer).unwrap(),
        json!({"total": 0, "groups": []})
    );
}

#[test]
fn test_age_range_within_state() {
    let snapshot = snapshot();
    let (answer, _) = evaluate_raw(
        &snapshot,
        &raw(json!({"negeri": "Johor", "umur_min": "18", "umur_max": "30"})),
    );

    assert_eq!(answer.total, 5);
    assert!(answer.group("Umur").is_none());
    assert!(answer.group("Negeri").is_none());
    let jantina = answer.group("Jantina").unwrap();
    assert_eq!(jantina.count_for("Lelaki"), Some(5.0));
    assert_eq!(jantina.count_for("Perempuan"), None);
}

#[test]
fn test_age_bounds_are_inclusive_and_skip_unknown_ages() {
    let snapshot = snapshot();
    let plan = Plan::any().with_age_range(Some(20), Some(40));
    // Rows aged 20, 35 and 40; the row without an age never matches.
    assert_eq!(evaluate(&snapshot, &plan).total, 10);

    let integer_bounds = raw(json!({"umur_min": 20, "umur_max": 40}));
    assert_eq!(evaluate_raw(&snapshot, &integer_bounds).0.total, 10);
}

#[test]
fn test_status_oku_filters_oku_column() {
    let snapshot = snapshot();
    let (answer, _) = evaluate_raw(&snapshot, &raw(json!({"status_oku": "OKU"})));
    assert_eq!(answer.total, 10);
    assert!(answer.group("Status OKU").is_none());

    let plan = Plan::any().with(PlanField::StatusOku, "Bukan OKU");
    assert_eq!(evaluate(&snapshot, &plan).total, 12);
}

#[test]
fn test_missing_cells_match_no_data_label() {
    let snapshot = snapshot();
    let (answer, _) = evaluate_raw(&snapshot, &raw(json!({"pendidikan_tertinggi": "Tiada Data"})));
    assert_eq!(answer.total, 4);

    let (answer, _) = evaluate_raw(&snapshot, &raw(json!({"status_oku": "Tiada Data"})));
    assert_eq!(answer.total, 4);
}

#[test]
fn test_malformed_bound_is_ignored_with_diagnostic() {
    let snapshot = snapshot();
    let (answer, validated) = evaluate_raw(&snapshot, &raw(json!({"umur_min": "not-a-number"})));

    assert_eq!(answer, evaluate(&snapshot, &Plan::any()));
    assert_eq!(validated.diagnostics.len(), 1);
    assert_eq!(validated.diagnostics[0].key(), "umur_min");
}

#[test]
fn test_unrecognized_keys_are_ignored() {
    let plan = raw(json!({"negara": "Malaysia", "negeri": "Johor"}));
    let validated = validate_plan(&plan);
    assert!(validated.diagnostics.is_empty());
    assert_eq!(validated.plan, Plan::any().with(PlanField::Negeri, "Johor"));
}

#[test]
fn test_answer_wire_format() {
    let snapshot = snapshot();
    let (answer, _) = evaluate_raw(&snapshot, &raw(json!({"negeri": "Perak", "jantina": "Lelaki"})));

    assert_eq!(
        serde_json::to_value(&answer).unwrap(),
        json!({
            "total": 2,
            "groups": [
                {"label": "Daerah", "data": [{"Daerah": "Ipoh", "COUNT": 2.5}]},
                {"label": "Etnik", "data": [{"Etnik": "India", "COUNT": 2.5}]},
                {"label": "Umur", "data": [{"Umur": 35, "COUNT": 2.5}]},
                {"label": "Status OKU", "data": [{"Status OKU": "Bukan OKU", "COUNT": 2.5}]},
                {"label": "Pekerjaan Utama", "data": [{"Pekerjaan Utama": "Guru", "COUNT": 2.5}]},
                {"label": "Pendidikan Tertinggi", "data": [{"Pendidikan Tertinggi": "SPM", "COUNT": 2.5}]}
            ]
        })
    );
}

#[test]
fn test_integral_counts_serialize_as_integers() {
    let snapshot = snapshot();
    let (answer, _) = evaluate_raw(&snapshot, &raw(json!({"negeri": "Johor"})));
    let value = serde_json::to_value(&answer).unwrap();

    let jantina = &value["groups"]
        .as_array()
        .unwrap()
        .iter()
        .find(|g| g["label"] == "Jantina")
        .unwrap()["data"];
    assert_eq!(
        jantina,
        &json!([{"Jantina": "Lelaki", "COUNT": 5}, {"Jantina": "Perempuan", "COUNT": 3}])
    );
}
