//! Types for validated filter plans.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::dataset::Column;

/// Sentinel meaning "unconstrained".
pub const ANY: &str = "Any";

/// The untrusted plan as it arrives from a generator or a client.
pub type RawPlan = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// Field bindings
// ============================================================================

/// Categorical plan fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanField {
    Negeri,
    Daerah,
    Jantina,
    Etnik,
    StatusOku,
    PekerjaanUtama,
    PendidikanTertinggi,
}

/// Binds a plan key to the dataset column it filters and its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBinding {
    pub field: PlanField,
    pub plan_key: &'static str,
    pub column: Column,
    pub label: &'static str,
}

/// Plan key to column table. The only place `status_oku` is tied to `oku`.
pub static FIELD_BINDINGS: [FieldBinding; 7] = [
    FieldBinding {
        field: PlanField::Negeri,
        plan_key: "negeri",
        column: Column::Negeri,
        label: "Negeri",
    },
    FieldBinding {
        field: PlanField::Daerah,
        plan_key: "daerah",
        column: Column::Daerah,
        label: "Daerah",
    },
    FieldBinding {
        field: PlanField::Jantina,
        plan_key: "jantina",
        column: Column::Jantina,
        label: "Jantina",
    },
    FieldBinding {
        field: PlanField::Etnik,
        plan_key: "etnik",
        column: Column::Etnik,
        label: "Etnik",
    },
    FieldBinding {
        field: PlanField::StatusOku,
        plan_key: "status_oku",
        column: Column::Oku,
        label: "Status OKU",
    },
    FieldBinding {
        field: PlanField::PekerjaanUtama,
        plan_key: "pekerjaan_utama",
        column: Column::PekerjaanUtama,
        label: "Pekerjaan Utama",
    },
    FieldBinding {
        field: PlanField::PendidikanTertinggi,
        plan_key: "pendidikan_tertinggi",
        column: Column::PendidikanTertinggi,
        label: "Pendidikan Tertinggi",
    },
];

impl PlanField {
    pub fn binding(self) -> &'static FieldBinding {
        // FIELD_BINDINGS holds exactly one entry per variant, in declaration order.
        &FIELD_BINDINGS[self as usize]
    }

    pub fn plan_key(self) -> &'static str {
        self.binding().plan_key
    }

    pub fn column(self) -> Column {
        self.binding().column
    }

    pub fn label(self) -> &'static str {
        self.binding().label
    }
}

/// Age bound keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBound {
    Min,
    Max,
}

impl AgeBound {
    pub const ALL: [AgeBound; 2] = [AgeBound::Min, AgeBound::Max];

    pub fn plan_key(self) -> &'static str {
        match self {
            Self::Min => "umur_min",
            Self::Max => "umur_max",
        }
    }
}

/// Every key the plan schema recognizes.
pub fn recognized_keys() -> impl Iterator<Item = &'static str> {
    FIELD_BINDINGS
        .iter()
        .map(|b| b.plan_key)
        .chain(AgeBound::ALL.iter().map(|b| b.plan_key()))
}

// ============================================================================
// Plan
// ============================================================================

/// A validated, fixed-shape plan. `None` means "Any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub negeri: Option<String>,
    pub daerah: Option<String>,
    pub jantina: Option<String>,
    pub etnik: Option<String>,
    pub status_oku: Option<String>,
    pub pekerjaan_utama: Option<String>,
    pub pendidikan_tertinggi: Option<String>,
    pub umur_min: Option<i64>,
    pub umur_max: Option<i64>,
}

impl Plan {
    /// Plan with every key unconstrained.
    pub fn any() -> Self {
        Self::default()
    }

    /// Constrained value for a categorical field.
    pub fn get(&self, field: PlanField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Set a categorical field. Passing `"Any"` clears the constraint.
    pub fn set(&mut self, field: PlanField, value: impl Into<String>) {
        let value = value.into();
        *self.slot_mut(field) = if value == ANY { None } else { Some(value) };
    }

    /// Builder form of [`Plan::set`].
    pub fn with(mut self, field: PlanField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn with_age_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.umur_min = min;
        self.umur_max = max;
        self
    }

    pub fn age_bound(&self, bound: AgeBound) -> Option<i64> {
        match bound {
            AgeBound::Min => self.umur_min,
            AgeBound::Max => self.umur_max,
        }
    }

    /// Whether the age dimension is unconstrained on both ends.
    pub fn age_unconstrained(&self) -> bool {
        self.umur_min.is_none() && self.umur_max.is_none()
    }

    /// Whether no key is constrained.
    pub fn is_unconstrained(&self) -> bool {
        self.age_unconstrained() && FIELD_BINDINGS.iter().all(|b| self.get(b.field).is_none())
    }

    /// Render back to the wire mapping, with `"Any"` for unconstrained keys.
    pub fn to_raw(&self) -> RawPlan {
        let mut raw = RawPlan::new();
        for binding in &FIELD_BINDINGS {
            let value = self.get(binding.field).unwrap_or(ANY);
            raw.insert(binding.plan_key.to_string(), value.into());
        }
        for bound in AgeBound::ALL {
            let value = match self.age_bound(bound) {
                Some(age) => age.to_string(),
                None => ANY.to_string(),
            };
            raw.insert(bound.plan_key().to_string(), value.into());
        }
        raw
    }

    fn slot(&self, field: PlanField) -> &Option<String> {
        match field {
            PlanField::Negeri => &self.negeri,
            PlanField::Daerah => &self.daerah,
            PlanField::Jantina => &self.jantina,
            PlanField::Etnik => &self.etnik,
            PlanField::StatusOku => &self.status_oku,
            PlanField::PekerjaanUtama => &self.pekerjaan_utama,
            PlanField::PendidikanTertinggi => &self.pendidikan_tertinggi,
        }
    }

    fn slot_mut(&mut self, field: PlanField) -> &mut Option<String> {
        match field {
            PlanField::Negeri => &mut self.negeri,
            PlanField::Daerah => &mut self.daerah,
            PlanField::Jantina => &mut self.jantina,
            PlanField::Etnik => &mut self.etnik,
            PlanField::StatusOku => &mut self.status_oku,
            PlanField::PekerjaanUtama => &mut self.pekerjaan_utama,
            PlanField::PendidikanTertinggi => &mut self.pendidikan_tertinggi,
        }
    }
}

impl Serialize for Plan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = self.to_raw();
        let mut map = serializer.serialize_map(Some(raw.len()))?;
        for (key, value) in &raw {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// A recovered problem found while validating a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanDiagnostic {
    /// An age bound that is neither an integer nor an integer string.
    InvalidAgeBound { key: String, value: String },
    /// A value of the wrong JSON type for its key.
    UnexpectedType { key: String, found: String },
}

impl PlanDiagnostic {
    pub fn key(&self) -> &str {
        match self {
            Self::InvalidAgeBound { key, .. } | Self::UnexpectedType { key, .. } => key,
        }
    }
}

impl std::fmt::Display for PlanDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAgeBound { key, value } => {
                write!(f, "{key}: '{value}' is not a whole number, treated as Any")
            }
            Self::UnexpectedType { key, found } => {
                write!(f, "{key}: expected a string, found {found}, treated as Any")
            }
        }
    }
}

/// Plan plus the diagnostics produced while validating it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidatedPlan {
    pub plan: Plan,
    pub diagnostics: Vec<PlanDiagnostic>,
}
