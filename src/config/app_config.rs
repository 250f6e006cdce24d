use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::embedding::{EmbeddingModelCatalog, EmbeddingModelSpec};
use crate::domain::index_build::BackendKind;
use crate::infrastructure::observability::ObservabilityConfig;
use crate::infrastructure::services::{IndexBuildConfig, SearchConfig, StatusDefaults};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub observability: ObservabilityConfig,
    pub indexing: IndexingConfig,
    pub search: SearchSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed to call the API from a browser; `*` allows any
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Index build settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    pub default_backend: BackendKind,
    pub default_embedding_model: String,
    pub embedding_models: Vec<EmbeddingModelSpec>,
    pub max_concurrent_builds: usize,
    pub job_retention_secs: u64,
    pub index_root: String,
    /// Upper bound on files read from a source directory per build
    pub max_files_per_source: usize,
}

/// Federated search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub adapter_timeout_ms: u64,
    pub max_concurrency: usize,
    pub max_top_k: usize,
    pub default_top_k: usize,
    pub default_complexity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        let catalog = EmbeddingModelCatalog::default();

        Self {
            default_backend: BackendKind::Hnsw,
            default_embedding_model: catalog.models()[0].id.clone(),
            embedding_models: catalog.models().to_vec(),
            max_concurrent_builds: 2,
            job_retention_secs: 24 * 3600,
            index_root: "indices".to_string(),
            max_files_per_source: 10_000,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            adapter_timeout_ms: 5000,
            max_concurrency: 8,
            max_top_k: 100,
            default_top_k: 10,
            default_complexity: 64,
        }
    }
}

impl IndexingConfig {
    pub fn catalog(&self) -> EmbeddingModelCatalog {
        EmbeddingModelCatalog::new(self.embedding_models.clone())
    }

    pub fn build_config(&self) -> IndexBuildConfig {
        IndexBuildConfig {
            max_concurrent_builds: self.max_concurrent_builds,
            job_retention: Duration::from_secs(self.job_retention_secs),
            index_root: self.index_root.clone(),
        }
    }

    pub fn status_defaults(&self) -> StatusDefaults {
        StatusDefaults {
            backend: self.default_backend,
            embedding_model: self.default_embedding_model.clone(),
        }
    }
}

impl SearchSettings {
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            adapter_timeout: Duration::from_millis(self.adapter_timeout_ms),
            max_concurrency: self.max_concurrency,
            max_top_k: self.max_top_k,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
