//! Source validation utilities

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::entity::SourceConfig;
use crate::domain::DomainError;

/// Maximum length for source IDs
pub const MAX_SOURCE_ID_LENGTH: usize = 64;

/// Maximum length for source names
pub const MAX_SOURCE_NAME_LENGTH: usize = 100;

/// Lowercase slug or generated `src-{uuid}`
static SOURCE_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").unwrap());

static CONFIG_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap());

/// Source validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum SourceValidationError {
    EmptyId,
    IdTooLong { length: usize, max: usize },
    InvalidIdFormat { id: String },
    EmptyName,
    NameTooLong { length: usize, max: usize },
    UnknownType { value: String },
    UnknownStatus { value: String },
    InvalidConfigKey { key: String },
    InvalidConfigValue { key: String, reason: &'static str },
}

impl fmt::Display for SourceValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "Source ID cannot be empty"),
            Self::IdTooLong { length, max } => {
                write!(f, "Source ID too long: {} characters (max {})", length, max)
            }
            Self::InvalidIdFormat { id } => write!(
                f,
                "Invalid source ID format '{}': must be lowercase alphanumeric with '-' or '_'",
                id
            ),
            Self::EmptyName => write!(f, "Source name cannot be empty"),
            Self::NameTooLong { length, max } => {
                write!(f, "Source name too long: {} characters (max {})", length, max)
            }
            Self::UnknownType { value } => write!(
                f,
                "Unknown source type '{}': expected document, email, chat, code or browser",
                value
            ),
            Self::UnknownStatus { value } => write!(f, "Unknown source status '{}'", value),
            Self::InvalidConfigKey { key } => write!(f, "Invalid config key '{}'", key),
            Self::InvalidConfigValue { key, reason } => {
                write!(f, "Invalid config value for '{}': {}", key, reason)
            }
        }
    }
}

impl std::error::Error for SourceValidationError {}

impl From<SourceValidationError> for DomainError {
    fn from(err: SourceValidationError) -> Self {
        match err {
            SourceValidationError::EmptyId
            | SourceValidationError::IdTooLong { .. }
            | SourceValidationError::InvalidIdFormat { .. } => {
                DomainError::invalid_id(err.to_string())
            }
            _ => DomainError::validation(err.to_string()),
        }
    }
}

pub fn validate_source_id(id: &str) -> Result<(), SourceValidationError> {
    if id.is_empty() {
        return Err(SourceValidationError::EmptyId);
    }

    if id.len() > MAX_SOURCE_ID_LENGTH {
        return Err(SourceValidationError::IdTooLong {
            length: id.len(),
            max: MAX_SOURCE_ID_LENGTH,
        });
    }

    if !SOURCE_ID_PATTERN.is_match(id) {
        return Err(SourceValidationError::InvalidIdFormat { id: id.to_string() });
    }

    Ok(())
}

/// Validate a display name, returning the trimmed form
pub fn validate_source_name(name: &str) -> Result<String, SourceValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(SourceValidationError::EmptyName);
    }

    let length = trimmed.chars().count();
    if length > MAX_SOURCE_NAME_LENGTH {
        return Err(SourceValidationError::NameTooLong {
            length,
            max: MAX_SOURCE_NAME_LENGTH,
        });
    }

    Ok(trimmed.to_string())
}

/// Config values must be scalars or arrays of scalars
pub fn validate_source_config(config: &SourceConfig) -> Result<(), SourceValidationError> {
    for (key, value) in config {
        if !CONFIG_KEY_PATTERN.is_match(key) {
            return Err(SourceValidationError::InvalidConfigKey { key: key.clone() });
        }

        match value {
            Value::Null => {
                return Err(SourceValidationError::InvalidConfigValue {
                    key: key.clone(),
                    reason: "value cannot be null",
                });
            }
            Value::Object(_) => {
                return Err(SourceValidationError::InvalidConfigValue {
                    key: key.clone(),
                    reason: "nested objects are not supported",
                });
            }
            Value::Array(items) if items.iter().any(|v| v.is_object() || v.is_array()) => {
                return Err(SourceValidationError::InvalidConfigValue {
                    key: key.clone(),
                    reason: "arrays may only contain scalar values",
                });
            }
            _ => {}
        }
    }

    Ok(())
}
