//! Configuration settings for the Demografi service.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
    pub planner: PlannerConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            PathBuf::from("config.toml"),
            PathBuf::from("demografi.toml"),
            dirs::config_dir()
                .map(|p| p.join("demografi/config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".demografi/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.is_file() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be > 0".to_string()).into());
        }

        if self.dataset.csv_path.trim().is_empty() {
            return Err(ConfigError::MissingField("dataset.csv_path".to_string()).into());
        }

        if self.planner.base_url.is_empty() {
            return Err(ConfigError::MissingField("planner.base_url".to_string()).into());
        }
        if self.planner.model.is_empty() {
            return Err(ConfigError::MissingField("planner.model".to_string()).into());
        }

        if self.embedding.provider == EmbeddingProvider::Api {
            if self.embedding.api.base_url.is_empty() {
                return Err(ConfigError::MissingField("embedding.api.base_url".to_string()).into());
            }
            if self.embedding.api.model.is_empty() {
                return Err(ConfigError::MissingField("embedding.api.model".to_string()).into());
            }
        }

        if self.retrieval.top_k == 0 {
            return Err(ConfigError::Invalid("retrieval.top_k must be > 0".to_string()).into());
        }

        Ok(())
    }

    /// Expanded path of the dataset CSV file.
    pub fn csv_path(&self) -> PathBuf {
        expand_path(&self.dataset.csv_path)
    }

    /// Expanded path of the persisted row-embedding index.
    pub fn index_path(&self) -> PathBuf {
        expand_path(&self.retrieval.index_path)
    }
}

fn expand_path(raw: &str) -> PathBuf {
    let expanded = shellexpand::tilde(raw);
    PathBuf::from(expanded.into_owned())
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// Allow cross-origin requests from any origin
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
        }
    }
}

/// Dataset configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Path to the source CSV file
    pub csv_path: String,
    /// Label stored for missing or placeholder cells
    pub no_data_label: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            csv_path: "data/cube_dashboard_portal_analitik_v3_mapped.csv".to_string(),
            no_data_label: crate::dataset::NO_DATA.to_string(),
        }
    }
}

/// Chat-completion plan generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Base URL for the OpenAI-compatible API
    pub base_url: String,
    /// Chat model name
    pub model: String,
    /// API key (loaded from environment if not set)
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: None,
            timeout_secs: 30,
            temperature: 0.0,
        }
    }
}

/// Embedding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider type: "local" or "api"
    pub provider: EmbeddingProvider,
    /// Model name for local embeddings
    pub model: String,
    /// API configuration
    pub api: ApiEmbeddingConfig,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Api,
            model: "all-MiniLM-L6-v2".to_string(),
            api: ApiEmbeddingConfig::default(),
        }
    }
}

/// Embedding provider enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    Local,
    Api,
}

/// API embedding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEmbeddingConfig {
    /// Base URL for the embedding API
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Width of the vectors the model returns
    pub dimension: usize,
    /// API key (loaded from environment if not set)
    pub api_key: Option<String>,
    /// Batch size for embedding requests
    pub batch_size: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiEmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
            api_key: None,
            batch_size: 100,
            timeout_secs: 30,
        }
    }
}

/// Semantic retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Build the row index at startup and serve /retrieve
    pub enabled: bool,
    /// Default number of rows returned
    pub top_k: usize,
    /// Where row embeddings are persisted between restarts
    pub index_path: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_k: 10,
            index_path: "data/row_embeddings.json".to_string(),
        }
    }
}

/// Plan cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable caching of generated plans
    pub enabled: bool,
    /// Maximum number of cached plans
    pub max_entries: u64,
    /// TTL for cached plans in seconds
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 1000,
            ttl_secs: 3600,
        }
    }
}
