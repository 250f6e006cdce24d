//! Data source domain entities

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::validation::{SourceValidationError, validate_source_id};

/// Validated data source identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceId(String);

impl SourceId {
    /// Create a new validated source ID
    pub fn new(id: impl Into<String>) -> Result<Self, SourceValidationError> {
        let id = id.into();
        validate_source_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a new source ID with UUID
    pub fn generate() -> Self {
        Self(format!("src-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SourceId {
    type Error = SourceValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SourceId> for String {
    fn from(id: SourceId) -> Self {
        id.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Kind of content a source connects to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Document,
    Email,
    Chat,
    Code,
    Browser,
}

impl SourceType {
    pub const ALL: [SourceType; 5] = [
        Self::Document,
        Self::Email,
        Self::Chat,
        Self::Code,
        Self::Browser,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Email => "email",
            Self::Chat => "chat",
            Self::Code => "code",
            Self::Browser => "browser",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = SourceValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "document" | "documents" => Ok(Self::Document),
            "email" | "mail" => Ok(Self::Email),
            // the desktop client labels chat history by its messenger name
            "chat" | "wechat" => Ok(Self::Chat),
            "code" => Ok(Self::Code),
            "browser" => Ok(Self::Browser),
            other => Err(SourceValidationError::UnknownType {
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle status of a data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    /// Registered but never indexed
    #[default]
    Configured,

    /// A build job currently owns this source
    Indexing,

    /// Indexed and searchable
    Ready,

    /// Last build failed
    Error,
}

impl SourceStatus {
    /// Check whether `self -> target` is a legal lifecycle edge
    pub fn can_transition_to(&self, target: SourceStatus) -> bool {
        match (self, target) {
            (_, Self::Error) => true,
            (Self::Configured, Self::Indexing) => true,
            (Self::Ready, Self::Indexing) => true,
            (Self::Indexing, Self::Ready) => true,
            _ => false,
        }
    }

    /// Statuses a cancelled build may restore a source to
    pub fn is_restorable(&self) -> bool {
        matches!(self, Self::Configured | Self::Ready)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configured => "configured",
            Self::Indexing => "indexing",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceStatus {
    type Err = SourceValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "configured" => Ok(Self::Configured),
            "indexing" => Ok(Self::Indexing),
            "ready" => Ok(Self::Ready),
            "error" => Ok(Self::Error),
            other => Err(SourceValidationError::UnknownStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// Source configuration (connector-specific key-value pairs)
pub type SourceConfig = HashMap<String, Value>;

/// A configured data source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    id: SourceId,
    name: String,
    source_type: SourceType,
    status: SourceStatus,
    config: SourceConfig,
    item_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_indexed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    version: u64,
    registration_seq: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DataSource {
    /// Create a freshly registered source (configured, version 0)
    pub fn new(
        id: SourceId,
        name: impl Into<String>,
        source_type: SourceType,
        config: SourceConfig,
    ) -> Self {
        let now = Utc::now();

        Self {
            id,
            name: name.into(),
            source_type,
            status: SourceStatus::Configured,
            config,
            item_count: 0,
            last_indexed: None,
            error_message: None,
            version: 0,
            registration_seq: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &SourceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    pub fn status(&self) -> SourceStatus {
        self.status
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Read a string config value
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(Value::as_str)
    }

    pub fn item_count(&self) -> u64 {
        self.item_count
    }

    pub fn last_indexed(&self) -> Option<DateTime<Utc>> {
        self.last_indexed
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn registration_seq(&self) -> u64 {
        self.registration_seq
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_ready(&self) -> bool {
        self.status == SourceStatus::Ready
    }

    /// Whether a filter entry (source id or type name) selects this source
    pub fn matches_selector(&self, selector: &str) -> bool {
        let selector = selector.trim();

        if selector == self.id.as_str() {
            return true;
        }

        selector
            .parse::<SourceType>()
            .map(|t| t == self.source_type)
            .unwrap_or(false)
    }

    // Mutators are crate-private: only the registry changes sources

    pub(crate) fn assign_registration_seq(&mut self, seq: u64) {
        self.registration_seq = seq;
    }

    pub(crate) fn set_status(&mut self, status: SourceStatus) {
        self.status = status;
    }

    pub(crate) fn set_item_count(&mut self, item_count: u64) {
        self.item_count = item_count;
    }

    pub(crate) fn set_last_indexed(&mut self, at: DateTime<Utc>) {
        self.last_indexed = Some(at);
    }

    pub(crate) fn set_error_message(&mut self, message: Option<String>) {
        self.error_message = message;
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn set_config(&mut self, config: SourceConfig) {
        self.config = config;
    }

    /// Record a stored mutation
    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
        self.updated_at = Utc::now();
    }
}
