//! Fixed dataset schema.

use serde::{Deserialize, Serialize};

/// Columns of the source dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    Jantina,
    Umur,
    Daerah,
    Negeri,
    Etnik,
    Oku,
    PendidikanTertinggi,
    PekerjaanUtama,
    Count,
}

impl Column {
    /// Every column the source file must provide.
    pub const REQUIRED: [Column; 9] = [
        Column::Jantina,
        Column::Umur,
        Column::Daerah,
        Column::Negeri,
        Column::Etnik,
        Column::Oku,
        Column::PendidikanTertinggi,
        Column::PekerjaanUtama,
        Column::Count,
    ];

    /// Header name in the source file.
    pub fn name(self) -> &'static str {
        match self {
            Self::Jantina => "jantina",
            Self::Umur => "umur",
            Self::Daerah => "daerah",
            Self::Negeri => "negeri",
            Self::Etnik => "etnik",
            Self::Oku => "oku",
            Self::PendidikanTertinggi => "pendidikan_tertinggi",
            Self::PekerjaanUtama => "pekerjaan_utama",
            Self::Count => "COUNT",
        }
    }

    /// Whether the column holds free-text category values.
    pub fn is_categorical(self) -> bool {
        !matches!(self, Self::Umur | Self::Count)
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_columns_are_unique() {
        let mut names: Vec<_> = Column::REQUIRED.iter().map(|c| c.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Column::REQUIRED.len());
    }

    #[test]
    fn test_categorical_columns() {
        let categorical = Column::REQUIRED.iter().filter(|c| c.is_categorical()).count();
        assert_eq!(categorical, 7);
        assert!(!Column::Umur.is_categorical());
        assert!(!Column::Count.is_categorical());
    }
}
