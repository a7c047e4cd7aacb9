//! Answer shape returned to callers.

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

/// Largest weight that still round-trips exactly as a JSON integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Value a breakdown is grouped on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    Number(NumericKey),
    Text(String),
}

impl GroupKey {
    pub fn number(value: f64) -> Self {
        Self::Number(NumericKey::new(value))
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A numeric key such as an age, totally ordered so it can key a `BTreeMap`.
#[derive(Debug, Clone, Copy)]
pub struct NumericKey(f64);

impl NumericKey {
    pub fn new(value: f64) -> Self {
        // -0.0 and 0.0 group together
        Self(if value == 0.0 { 0.0 } else { value })
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for NumericKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for NumericKey {}

impl PartialOrd for NumericKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NumericKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for NumericKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl std::fmt::Display for NumericKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if is_exact_integer(self.0) {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Serialize for NumericKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_number(self.0, serializer)
    }
}

fn is_exact_integer(value: f64) -> bool {
    value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER
}

/// Integral values serialize as integers, others as floats.
fn serialize_number<S: Serializer>(value: f64, serializer: S) -> Result<S::Ok, S::Error> {
    if is_exact_integer(value) {
        serializer.serialize_i64(value as i64)
    } else {
        serializer.serialize_f64(value)
    }
}

/// One (value, summed weight) pair inside a breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupEntry {
    pub key: GroupKey,
    pub count: f64,
}

/// Weights grouped by one unconstrained dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownGroup {
    pub label: String,
    pub data: Vec<GroupEntry>,
}

impl BreakdownGroup {
    pub fn new(label: impl Into<String>, data: Vec<GroupEntry>) -> Self {
        Self {
            label: label.into(),
            data,
        }
    }

    /// Summed weight for a text key, if present.
    pub fn count_for(&self, key: &str) -> Option<f64> {
        self.data
            .iter()
            .find(|entry| matches!(&entry.key, GroupKey::Text(text) if text == key))
            .map(|entry| entry.count)
    }

    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.data.iter().map(|entry| &entry.key)
    }
}

/// Total plus breakdowns for one evaluated plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryAnswer {
    pub total: u64,
    pub groups: Vec<BreakdownGroup>,
}

impl QueryAnswer {
    pub fn new(total: u64, groups: Vec<BreakdownGroup>) -> Self {
        Self { total, groups }
    }

    /// Answer for an empty selection.
    pub fn empty() -> Self {
        Self::new(0, Vec::new())
    }

    pub fn group(&self, label: &str) -> Option<&BreakdownGroup> {
        self.groups.iter().find(|group| group.label == label)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.groups.iter().map(|group| group.label.as_str()).collect()
    }
}

// Each entry is emitted as `{<label>: <key>, "COUNT": <weight>}`.
impl Serialize for BreakdownGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut group = serializer.serialize_struct("BreakdownGroup", 2)?;
        group.serialize_field("label", &self.label)?;
        group.serialize_field(
            "data",
            &LabelledEntries {
                label: &self.label,
                entries: &self.data,
            },
        )?;
        group.end()
    }
}

struct LabelledEntries<'a> {
    label: &'a str,
    entries: &'a [GroupEntry],
}

impl Serialize for LabelledEntries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter().map(|entry| LabelledEntry {
            label: self.label,
            entry,
        }))
    }
}

struct LabelledEntry<'a> {
    label: &'a str,
    entry: &'a GroupEntry,
}

impl Serialize for LabelledEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.label, &self.entry.key)?;
        map.serialize_entry("COUNT", &Weight(self.entry.count))?;
        map.end()
    }
}

struct Weight(f64);

impl Serialize for Weight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_number(self.0, serializer)
    }
}
