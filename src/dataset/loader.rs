//! CSV loading into a [`DatasetSnapshot`].

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{info, warn};

use crate::error::{DatasetError, Result};

use super::normalize::{is_missing, normalize};
use super::schema::Column;
use super::snapshot::{DatasetSnapshot, Record};

/// Reads the source CSV, validating the schema and normalizing cells.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    no_data_label: String,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new(super::NO_DATA)
    }
}

/// Header positions of the required columns.
struct ColumnIndex(HashMap<Column, usize>);

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> std::result::Result<Self, DatasetError> {
        let mut positions = HashMap::new();
        for column in Column::REQUIRED {
            let idx = headers
                .iter()
                .position(|h| h.trim() == column.name())
                .ok_or_else(|| DatasetError::MissingColumn(column.name().to_string()))?;
            positions.insert(column, idx);
        }
        Ok(Self(positions))
    }

    fn get<'r>(&self, row: &'r StringRecord, column: Column) -> Option<&'r str> {
        self.0.get(&column).and_then(|&idx| row.get(idx))
    }
}

impl DatasetLoader {
    pub fn new(no_data_label: impl Into<String>) -> Self {
        Self {
            no_data_label: no_data_label.into(),
        }
    }

    /// Load a snapshot from a CSV file on disk.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<DatasetSnapshot> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DatasetError::NotFound(path.display().to_string()).into());
        }

        let file = std::fs::File::open(path)?;
        let snapshot = self.load_reader(file)?;
        info!(
            path = %path.display(),
            records = snapshot.len(),
            "Dataset loaded"
        );
        Ok(snapshot)
    }

    /// Load a snapshot from any CSV byte stream.
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<DatasetSnapshot> {
        let mut reader = ReaderBuilder::new().from_reader(reader);
        let headers = reader.headers().map_err(DatasetError::from)?.clone();
        let columns = ColumnIndex::from_headers(&headers)?;

        let mut records = Vec::new();
        let mut coerced_counts = 0usize;

        for (idx, row) in reader.records().enumerate() {
            let row = row.map_err(DatasetError::from)?;
            let row_number = idx + 1;

            let umur = parse_age(columns.get(&row, Column::Umur), row_number)?;
            let (count, coerced) = coerce_count(columns.get(&row, Column::Count));
            if coerced {
                coerced_counts += 1;
            }

            let text = |column: Column| -> String {
                normalize(columns.get(&row, column), &self.no_data_label).to_string()
            };

            records.push(Record {
                jantina: text(Column::Jantina),
                umur,
                daerah: text(Column::Daerah),
                negeri: text(Column::Negeri),
                etnik: text(Column::Etnik),
                oku: text(Column::Oku),
                pendidikan_tertinggi: text(Column::PendidikanTertinggi),
                pekerjaan_utama: text(Column::PekerjaanUtama),
                count,
            });
        }

        if coerced_counts > 0 {
            warn!(rows = coerced_counts, "COUNT values coerced to 0");
        }

        Ok(DatasetSnapshot::with_label(records, self.no_data_label.clone()))
    }
}

/// Parse an age cell. Missing cells become `None`; anything else must be a finite number.
/// Fractional ages are kept as they are.
fn parse_age(raw: Option<&str>, row: usize) -> std::result::Result<Option<f64>, DatasetError> {
    if is_missing(raw) {
        return Ok(None);
    }
    let value = raw.unwrap_or_default().trim();

    match value.parse::<f64>() {
        Ok(age) if age.is_finite() => Ok(Some(age)),
        _ => Err(DatasetError::InvalidAge {
            row,
            value: value.to_string(),
        }),
    }
}

/// Coerce a COUNT cell to a non-negative weight. The flag reports a coercion.
fn coerce_count(raw: Option<&str>) -> (f64, bool) {
    match raw.map(str::trim).and_then(|v| v.parse::<f64>().ok()) {
        Some(weight) if weight.is_finite() && weight >= 0.0 => (weight, false),
        _ => (0.0, true),
    }
}
