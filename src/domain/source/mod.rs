//! Data source domain module

mod entity;
pub mod repository;
mod validation;

pub use entity::{DataSource, SourceConfig, SourceId, SourceStatus, SourceType};
pub use repository::SourceRepository;
pub use validation::{
    validate_source_config, validate_source_id, validate_source_name, SourceValidationError,
    MAX_SOURCE_ID_LENGTH, MAX_SOURCE_NAME_LENGTH,
};
