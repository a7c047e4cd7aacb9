//! Totals and per-dimension breakdowns over a selection.

use std::collections::BTreeMap;

use crate::dataset::{DatasetSnapshot, Record};
use crate::plan::{Plan, PlanField};

use super::mask::SelectionMask;
use super::result::{BreakdownGroup, GroupEntry, GroupKey, QueryAnswer};

/// A dimension a breakdown can be grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Field(PlanField),
    Age,
}

/// Order in which breakdown groups are emitted.
pub const DIMENSION_ORDER: [Dimension; 8] = [
    Dimension::Field(PlanField::Negeri),
    Dimension::Field(PlanField::Daerah),
    Dimension::Field(PlanField::Jantina),
    Dimension::Field(PlanField::Etnik),
    Dimension::Age,
    Dimension::Field(PlanField::StatusOku),
    Dimension::Field(PlanField::PekerjaanUtama),
    Dimension::Field(PlanField::PendidikanTertinggi),
];

impl Dimension {
    pub fn label(self) -> &'static str {
        match self {
            Self::Field(field) => field.label(),
            Self::Age => "Umur",
        }
    }

    /// A dimension is broken down only when the plan leaves it open.
    pub fn is_open(self, plan: &Plan) -> bool {
        match self {
            Self::Field(field) => plan.get(field).is_none(),
            Self::Age => plan.age_unconstrained(),
        }
    }

    /// Grouping key of a record. Records without an age have no age key.
    fn key(self, record: &Record) -> Option<GroupKey> {
        match self {
            Self::Field(field) => record
                .text(field.column())
                .map(|value| GroupKey::Text(value.to_string())),
            Self::Age => record.umur.map(GroupKey::number),
        }
    }
}

/// Relative distance from a whole number below which a sum counts as that number.
const WHOLE_TOLERANCE: f64 = 1e-9;

/// Sum of weights over the selection, truncated toward zero.
///
/// Fractional weights are summed in `f64`, so a sum such as `0.7 + 0.2 + 0.1`
/// lands just under `1.0`. Sums within [`WHOLE_TOLERANCE`] of a whole number
/// snap to it before truncating; a genuine fraction like `2.5` still gives `2`.
pub fn total(snapshot: &DatasetSnapshot, mask: &SelectionMask) -> u64 {
    let records = snapshot.records();
    let sum: f64 = mask.selected().map(|idx| records[idx].count).sum();
    truncate_weight(sum)
}

fn truncate_weight(sum: f64) -> u64 {
    let nearest = sum.round();
    let snapped = if (sum - nearest).abs() <= WHOLE_TOLERANCE * nearest.abs().max(1.0) {
        nearest
    } else {
        sum.trunc()
    };
    // Weights are non-negative, so the cast only truncates.
    snapped as u64
}

/// Breakdown of the selection along one dimension, keys ascending.
pub fn breakdown(
    snapshot: &DatasetSnapshot,
    mask: &SelectionMask,
    dimension: Dimension,
) -> BreakdownGroup {
    let records = snapshot.records();
    let mut sums: BTreeMap<GroupKey, f64> = BTreeMap::new();
    for idx in mask.selected() {
        let record = &records[idx];
        if let Some(key) = dimension.key(record) {
            *sums.entry(key).or_insert(0.0) += record.count;
        }
    }

    let data = sums
        .into_iter()
        .map(|(key, count)| GroupEntry { key, count })
        .collect();
    BreakdownGroup::new(dimension.label(), data)
}

/// Total plus one breakdown per open dimension. No breakdowns for an empty selection.
pub fn aggregate(snapshot: &DatasetSnapshot, mask: &SelectionMask, plan: &Plan) -> QueryAnswer {
    if mask.is_none_selected() {
        return QueryAnswer::empty();
    }

    let groups = DIMENSION_ORDER
        .iter()
        .filter(|dimension| dimension.is_open(plan))
        .map(|&dimension| breakdown(snapshot, mask, dimension))
        .collect();

    QueryAnswer::new(total(snapshot, mask), groups)
}
