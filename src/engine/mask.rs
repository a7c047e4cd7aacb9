//! Predicate compilation and selection masks.

use bitvec::prelude::*;

use crate::dataset::{Column, DatasetSnapshot, Record};
use crate::plan::{Plan, FIELD_BINDINGS};

/// One conjunct of a compiled plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate<'p> {
    /// Exact equality on a categorical column.
    Equals { column: Column, value: &'p str },
    /// `umur >= bound`. Records without an age never match.
    AgeAtLeast(i64),
    /// `umur <= bound`. Records without an age never match.
    AgeAtMost(i64),
}

impl Predicate<'_> {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Equals { column, value } => record.text(*column) == Some(*value),
            Self::AgeAtLeast(bound) => record.umur.is_some_and(|age| age >= *bound as f64),
            Self::AgeAtMost(bound) => record.umur.is_some_and(|age| age <= *bound as f64),
        }
    }
}

/// Turn a validated plan into its conjuncts. An unconstrained plan compiles to nothing.
pub fn compile(plan: &Plan) -> Vec<Predicate<'_>> {
    let mut predicates: Vec<Predicate<'_>> = FIELD_BINDINGS
        .iter()
        .filter_map(|binding| {
            plan.get(binding.field).map(|value| Predicate::Equals {
                column: binding.column,
                value,
            })
        })
        .collect();

    if let Some(min) = plan.umur_min {
        predicates.push(Predicate::AgeAtLeast(min));
    }
    if let Some(max) = plan.umur_max {
        predicates.push(Predicate::AgeAtMost(max));
    }
    predicates
}

/// One bit per record, set when the record satisfies every predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionMask {
    bits: BitVec,
}

impl SelectionMask {
    /// Mask selecting every one of `len` records.
    pub fn all(len: usize) -> Self {
        Self {
            bits: bitvec![1; len],
        }
    }

    /// AND the mask with a predicate evaluated over `records`.
    pub fn and(&mut self, records: &[Record], predicate: &Predicate<'_>) {
        for (idx, record) in records.iter().enumerate() {
            if self.bits[idx] && !predicate.matches(record) {
                self.bits.set(idx, false);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn is_selected(&self, idx: usize) -> bool {
        self.bits.get(idx).map(|bit| *bit).unwrap_or(false)
    }

    pub fn selected_count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Whether no record is selected.
    pub fn is_none_selected(&self) -> bool {
        self.bits.not_any()
    }

    /// Indices of selected records, ascending.
    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }
}

/// Compile `plan` and apply it to the snapshot.
pub fn select(snapshot: &DatasetSnapshot, plan: &Plan) -> SelectionMask {
    let records = snapshot.records();
    let mut mask = SelectionMask::all(records.len());
    for predicate in compile(plan) {
        mask.and(records, &predicate);
    }
    mask
}
