//! Index build job entities

use std::fmt;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::request::BuildSpec;
use crate::domain::DomainError;
use crate::domain::source::{SourceId, SourceStatus};

/// Regex pattern for valid job IDs: job-{uuid}
static JOB_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^job-[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$").unwrap()
});

/// Number of pipeline stages before completion
pub const TOTAL_STAGES: u8 = 5;

/// Validated build job identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();

        if !JOB_ID_PATTERN.is_match(&id) {
            return Err(DomainError::invalid_id(format!(
                "Invalid job ID '{}': must be in format job-{{uuid}}",
                id
            )));
        }

        Ok(Self(id))
    }

    pub fn generate() -> Self {
        Self(format!("job-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for JobId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pipeline stage of a build job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildStage {
    #[default]
    Init,
    EmbeddingModelLoad,
    DocumentProcessing,
    VectorIndexBuild,
    Finalize,
    Completed,
    Error,
    Cancelled,
}

impl BuildStage {
    /// Position in the pipeline; `None` for ERROR and CANCELLED
    pub fn index(&self) -> Option<u8> {
        match self {
            Self::Init => Some(0),
            Self::EmbeddingModelLoad => Some(1),
            Self::DocumentProcessing => Some(2),
            Self::VectorIndexBuild => Some(3),
            Self::Finalize => Some(4),
            Self::Completed => Some(5),
            Self::Error | Self::Cancelled => None,
        }
    }

    /// Progress percentage on entering this stage
    pub fn entry_progress(&self) -> Option<f64> {
        self.index()
            .map(|i| f64::from(i) * 100.0 / f64::from(TOTAL_STAGES))
    }

    /// The stage that follows on success
    pub fn next(&self) -> Option<BuildStage> {
        match self {
            Self::Init => Some(Self::EmbeddingModelLoad),
            Self::EmbeddingModelLoad => Some(Self::DocumentProcessing),
            Self::DocumentProcessing => Some(Self::VectorIndexBuild),
            Self::VectorIndexBuild => Some(Self::Finalize),
            Self::Finalize => Some(Self::Completed),
            Self::Completed | Self::Error | Self::Cancelled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error | Self::Cancelled)
    }

    /// Check whether `self -> target` is a legal stage edge
    pub fn can_transition_to(&self, target: BuildStage) -> bool {
        if self.is_terminal() {
            return false;
        }

        match target {
            Self::Error | Self::Cancelled => true,
            other => self.next() == Some(other),
        }
    }

    /// Human-readable step description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Init => "Queued",
            Self::EmbeddingModelLoad => "Loading embedding model",
            Self::DocumentProcessing => "Processing documents",
            Self::VectorIndexBuild => "Building vector index",
            Self::Finalize => "Finalizing index",
            Self::Completed => "Index created",
            Self::Error => "Failed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::EmbeddingModelLoad => "EMBEDDING_MODEL_LOAD",
            Self::DocumentProcessing => "DOCUMENT_PROCESSING",
            Self::VectorIndexBuild => "VECTOR_INDEX_BUILD",
            Self::Finalize => "FINALIZE",
            Self::Completed => "COMPLETED",
            Self::Error => "ERROR",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source targeted by a build job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTarget {
    pub source_id: SourceId,
    /// Status before the job marked the source `indexing`
    pub prior_status: SourceStatus,
    /// Source version after the job's last write
    pub observed_version: u64,
    /// Chunks produced for this source
    pub item_count: u64,
}

impl BuildTarget {
    pub fn new(source_id: SourceId, prior_status: SourceStatus, observed_version: u64) -> Self {
        Self {
            source_id,
            prior_status,
            observed_version,
            item_count: 0,
        }
    }
}

/// An asynchronous index build job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexBuildJob {
    id: JobId,
    spec: BuildSpec,
    stage: BuildStage,
    progress_percent: f64,
    current_step: String,
    total_steps: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    cancel_requested: bool,
    targets: Vec<BuildTarget>,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
}

impl IndexBuildJob {
    pub fn new(spec: BuildSpec, targets: Vec<BuildTarget>) -> Self {
        Self {
            id: JobId::generate(),
            spec,
            stage: BuildStage::Init,
            progress_percent: 0.0,
            current_step: BuildStage::Init.description().to_string(),
            total_steps: TOTAL_STAGES,
            error_message: None,
            cancel_requested: false,
            targets,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn spec(&self) -> &BuildSpec {
        &self.spec
    }

    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress_percent
    }

    pub fn current_step(&self) -> &str {
        &self.current_step
    }

    pub fn total_steps(&self) -> u8 {
        self.total_steps
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    pub fn targets(&self) -> &[BuildTarget] {
        &self.targets
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }

    pub fn targets_source(&self, id: &SourceId) -> bool {
        self.targets.iter().any(|t| &t.source_id == id)
    }

    /// Total chunks produced across all targets
    pub fn document_count(&self) -> u64 {
        self.targets.iter().map(|t| t.item_count).sum()
    }

    /// Move to the next pipeline stage
    pub fn advance_to(&mut self, stage: BuildStage) -> Result<(), DomainError> {
        if matches!(stage, BuildStage::Error | BuildStage::Cancelled)
            || !self.stage.can_transition_to(stage)
        {
            return Err(DomainError::conflict(format!(
                "Job '{}' cannot move from {} to {}",
                self.id, self.stage, stage
            )));
        }

        if self.stage == BuildStage::Init {
            self.started_at = Some(Utc::now());
        }

        self.stage = stage;
        self.current_step = stage.description().to_string();

        if let Some(entry) = stage.entry_progress() {
            self.progress_percent = self.progress_percent.max(entry);
        }

        if stage == BuildStage::Completed {
            self.completed_at = Some(Utc::now());
        }

        Ok(())
    }

    /// Report fractional progress within the current stage.
    ///
    /// Only stages with measurable work accept sub-progress; the result
    /// never decreases and stays below the next stage's entry value.
    pub fn report_sub_progress(&mut self, fraction: f64) {
        if !matches!(
            self.stage,
            BuildStage::DocumentProcessing | BuildStage::VectorIndexBuild
        ) {
            return;
        }

        let (Some(entry), Some(next_entry)) = (
            self.stage.entry_progress(),
            self.stage.next().and_then(|s| s.entry_progress()),
        ) else {
            return;
        };

        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let value = (entry + fraction * (next_entry - entry)).min(next_entry - 0.1);
        let value = (value * 10.0).floor() / 10.0;

        self.progress_percent = self.progress_percent.max(value);
    }

    /// Capture an execution fault
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::conflict(format!(
                "Job '{}' is already {}",
                self.id, self.stage
            )));
        }

        let message = message.into();
        self.stage = BuildStage::Error;
        self.current_step = format!("{}: {}", BuildStage::Error.description(), message);
        self.error_message = Some(message);
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Flag the job for cancellation; returns false when already terminal
    pub fn request_cancel(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }

        self.cancel_requested = true;
        true
    }

    /// Honour a pending cancel request
    pub fn mark_cancelled(&mut self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::conflict(format!(
                "Job '{}' is already {}",
                self.id, self.stage
            )));
        }

        self.stage = BuildStage::Cancelled;
        self.current_step = BuildStage::Cancelled.description().to_string();
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    pub fn target_mut(&mut self, id: &SourceId) -> Option<&mut BuildTarget> {
        self.targets.iter_mut().find(|t| &t.source_id == id)
    }
}
