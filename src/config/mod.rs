//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, IndexingConfig, LogFormat, LoggingConfig, SearchSettings, ServerConfig,
};
