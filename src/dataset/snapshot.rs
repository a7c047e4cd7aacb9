//! Immutable in-memory dataset.

use std::collections::BTreeSet;

use serde::Serialize;

use super::normalize::NO_DATA;
use super::schema::Column;

/// One row of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub jantina: String,
    /// Age in years, fractions kept; `None` when the source cell was missing.
    pub umur: Option<f64>,
    pub daerah: String,
    pub negeri: String,
    pub etnik: String,
    pub oku: String,
    pub pendidikan_tertinggi: String,
    pub pekerjaan_utama: String,
    /// Weighted population count, never negative.
    pub count: f64,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            jantina: NO_DATA.to_string(),
            umur: None,
            daerah: NO_DATA.to_string(),
            negeri: NO_DATA.to_string(),
            etnik: NO_DATA.to_string(),
            oku: NO_DATA.to_string(),
            pendidikan_tertinggi: NO_DATA.to_string(),
            pekerjaan_utama: NO_DATA.to_string(),
            count: 0.0,
        }
    }
}

impl Record {
    /// Value of a categorical column. `None` for `umur` and `COUNT`.
    pub fn text(&self, column: Column) -> Option<&str> {
        let value = match column {
            Column::Jantina => &self.jantina,
            Column::Daerah => &self.daerah,
            Column::Negeri => &self.negeri,
            Column::Etnik => &self.etnik,
            Column::Oku => &self.oku,
            Column::PendidikanTertinggi => &self.pendidikan_tertinggi,
            Column::PekerjaanUtama => &self.pekerjaan_utama,
            Column::Umur | Column::Count => return None,
        };
        Some(value.as_str())
    }

    /// Human-readable description used as the retrieval document for this row.
    pub fn describe(&self, no_data_label: &str) -> String {
        let umur = self
            .umur
            .map(format_number)
            .unwrap_or_else(|| no_data_label.to_string());

        format!(
            "Jantina: {}, Umur: {}, Daerah: {}, Negeri: {}, Etnik: {}, OKU: {}, \
             Pendidikan Tertinggi: {}, Pekerjaan: {}, Jumlah: {}",
            self.jantina,
            umur,
            self.daerah,
            self.negeri,
            self.etnik,
            self.oku,
            self.pendidikan_tertinggi,
            self.pekerjaan_utama,
            format_number(self.count),
        )
    }
}

/// Render an age or weight without a trailing `.0` when it is integral.
pub fn format_number(weight: f64) -> String {
    if weight.fract() == 0.0 && weight.abs() < i64::MAX as f64 {
        format!("{}", weight as i64)
    } else {
        weight.to_string()
    }
}

/// The loaded dataset. Read-only after construction; share it behind `Arc`.
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    records: Vec<Record>,
    no_data_label: String,
}

impl DatasetSnapshot {
    /// Build a snapshot using the default "no data" label.
    pub fn new(records: Vec<Record>) -> Self {
        Self::with_label(records, NO_DATA)
    }

    /// Build a snapshot with a custom "no data" label.
    pub fn with_label(records: Vec<Record>, no_data_label: impl Into<String>) -> Self {
        Self {
            records,
            no_data_label: no_data_label.into(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn no_data_label(&self) -> &str {
        &self.no_data_label
    }

    /// Sum of weights over every record.
    pub fn total_weight(&self) -> f64 {
        self.records.iter().map(|r| r.count).sum()
    }

    /// Distinct values of a categorical column, sorted.
    pub fn distinct_values(&self, column: Column) -> BTreeSet<&str> {
        self.records.iter().filter_map(|r| r.text(column)).collect()
    }

    /// Retrieval documents, one per record in snapshot order.
    pub fn row_texts(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.describe(&self.no_data_label))
            .collect()
    }
}
