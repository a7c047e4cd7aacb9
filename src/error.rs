//! Error types for the Demografi service.

use thiserror::Error;

/// Main error type for Demografi operations.
#[derive(Error, Debug)]
pub enum DemografiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Planner error: {0}")]
    Planner(#[from] PlannerError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Dataset loading and schema errors. All of these are fatal at startup.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Dataset file not found: {0}")]
    NotFound(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid age {value:?} on row {row}")]
    InvalidAge { row: usize, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors from the language-model plan generator.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Question is empty")]
    EmptyQuestion,

    #[error("API key not provided and OPENAI_API_KEY env var not set")]
    MissingApiKey,

    #[error("API error: {0}")]
    Api(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Model returned no choices")]
    EmptyResponse,

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),
}

/// Embedding-related errors.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Batch too large: {0} (max {1})")]
    BatchTooLarge(usize, usize),
}

/// Vector index and retrieval errors.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Retrieval is disabled")]
    Disabled,

    #[error("Index has {index} vectors but dataset has {texts} rows")]
    SizeMismatch { index: usize, texts: usize },

    #[error("Embedding provider returned no vector for the query")]
    EmptyQueryEmbedding,
}

/// Result type alias for Demografi operations.
pub type Result<T> = std::result::Result<T, DemografiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DemografiError::Config(ConfigError::MissingField("planner.model".to_string()));
        assert!(err.to_string().contains("planner.model"));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DemografiError = io_err.into();
        assert!(matches!(err, DemografiError::Io(_)));
    }

    #[test]
    fn test_dataset_error_names_column() {
        let err: DemografiError = DatasetError::MissingColumn("COUNT".to_string()).into();
        assert_eq!(err.to_string(), "Dataset error: Missing required column: COUNT");
    }
}
