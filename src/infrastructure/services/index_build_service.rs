//! Index build orchestrator - runs the staged build pipeline for data sources

use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, error, info, instrument, warn};

use super::source_service::{SourceRegistry, StatusFields};
use crate::domain::embedding::EmbeddingModelCatalog;
use crate::domain::error::DomainError;
use crate::domain::index_build::{
    BackendKind, BuildRequest, BuildSpec, BuildStage, BuildTarget, IndexBuildJob, IndexBuilder,
    IndexJobRepository, JobId, ProgressSink,
};
use crate::domain::source::{DataSource, SourceId, SourceStatus};
use crate::infrastructure::observability::{record_build_outcome, record_build_stage};

/// Attempts per source status write before giving up on version conflicts
const MAX_STATUS_WRITE_ATTEMPTS: usize = 3;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct IndexBuildConfig {
    /// Jobs allowed past INIT at the same time
    pub max_concurrent_builds: usize,
    /// How long terminal jobs are kept before `purge_expired` drops them
    pub job_retention: Duration,
    /// Logical root under which completed indices are addressed
    pub index_root: String,
}

impl Default for IndexBuildConfig {
    fn default() -> Self {
        Self {
            max_concurrent_builds: 2,
            job_retention: Duration::from_secs(24 * 3600),
            index_root: "indices".to_string(),
        }
    }
}

/// A completed index as listed by `GET /indices`
#[derive(Debug, Clone, Serialize)]
pub struct IndexRecord {
    pub name: String,
    pub path: String,
    pub backend: BackendKind,
    pub embedding_model: String,
    pub source_ids: Vec<SourceId>,
    pub document_count: u64,
    pub created_at: DateTime<Utc>,
    pub job_id: JobId,
}

/// Trait for the build orchestrator (for dynamic dispatch in AppState)
#[async_trait]
pub trait IndexBuildOrchestrator: Send + Sync + Debug {
    /// Validate a request, lock its sources and start the pipeline
    async fn submit(&self, request: BuildRequest) -> Result<IndexBuildJob, DomainError>;

    /// Snapshot of a job
    async fn get_progress(&self, id: &JobId) -> Result<IndexBuildJob, DomainError>;

    /// Request cancellation; a terminal job is returned unchanged
    async fn cancel(&self, id: &JobId) -> Result<IndexBuildJob, DomainError>;

    /// All retained jobs, newest first
    async fn list_jobs(&self) -> Result<Vec<IndexBuildJob>, DomainError>;

    /// Remove a terminal job
    async fn purge(&self, id: &JobId) -> Result<(), DomainError>;

    /// Remove terminal jobs older than the retention window
    async fn purge_expired(&self) -> Result<u64, DomainError>;

    /// Completed indices, most recently completed first, one per name
    async fn list_indices(&self) -> Result<Vec<IndexRecord>, DomainError>;
}

/// State shared between the service and its spawned pipelines
struct Pipeline {
    registry: Arc<dyn SourceRegistry>,
    jobs: Arc<dyn IndexJobRepository>,
    builder: Arc<dyn IndexBuilder>,
    permits: Arc<Semaphore>,
}

enum Outcome {
    Completed,
    Cancelled,
}

/// Source write performed by a job, retried on version conflicts
enum SourceWrite {
    Ready { item_count: u64, at: DateTime<Utc> },
    Failed(String),
    Revert(SourceStatus),
}

/// Index build orchestrator
pub struct IndexBuildService {
    pipeline: Arc<Pipeline>,
    catalog: EmbeddingModelCatalog,
    config: IndexBuildConfig,
    submit_lock: Mutex<()>,
}

impl Debug for IndexBuildService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexBuildService")
            .field("builder", &self.pipeline.builder)
            .field("config", &self.config)
            .finish()
    }
}

impl IndexBuildService {
    pub fn new(
        registry: Arc<dyn SourceRegistry>,
        jobs: Arc<dyn IndexJobRepository>,
        builder: Arc<dyn IndexBuilder>,
        catalog: EmbeddingModelCatalog,
        config: IndexBuildConfig,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_builds.max(1)));

        Self {
            pipeline: Arc::new(Pipeline {
                registry,
                jobs,
                builder,
                permits,
            }),
            catalog,
            config,
            submit_lock: Mutex::new(()),
        }
    }

    fn index_path(&self, name: &str) -> String {
        format!("{}/{}", self.config.index_root.trim_end_matches('/'), name)
    }

    /// A name is held by a running job or by a completed index over other sources.
    /// Rebuilding the same source set under its existing name replaces that index.
    fn ensure_name_available(
        &self,
        jobs: &[IndexBuildJob],
        spec: &BuildSpec,
    ) -> Result<(), DomainError> {
        let taken = jobs.iter().any(|job| {
            job.spec().name == spec.name
                && (!job.is_terminal()
                    || (job.stage() == BuildStage::Completed
                        && !same_sources(&job.spec().source_ids, &spec.source_ids)))
        });

        if taken {
            return Err(DomainError::validation(format!(
                "Index '{}' already exists",
                spec.name
            )));
        }

        Ok(())
    }

    /// At most one non-terminal job may target a source
    fn ensure_sources_idle(
        &self,
        jobs: &[IndexBuildJob],
        spec: &BuildSpec,
    ) -> Result<(), DomainError> {
        for id in &spec.source_ids {
            if let Some(job) = jobs
                .iter()
                .find(|job| !job.is_terminal() && job.targets_source(id))
            {
                return Err(DomainError::conflict(format!(
                    "Data source '{}' is already targeted by build job '{}'",
                    id,
                    job.id()
                )));
            }
        }

        Ok(())
    }

    /// Mark every target `indexing`, reverting earlier marks on failure
    async fn lock_sources(&self, spec: &BuildSpec) -> Result<Vec<BuildTarget>, DomainError> {
        let mut sources = Vec::with_capacity(spec.source_ids.len());
        for id in &spec.source_ids {
            let source = match self.pipeline.registry.get(id).await {
                Ok(source) => source,
                Err(e) if e.is_not_found() => {
                    return Err(DomainError::validation(format!(
                        "Unknown data source '{}'",
                        id
                    )));
                }
                Err(e) => return Err(e),
            };

            if source.status() == SourceStatus::Indexing {
                return Err(DomainError::conflict(format!(
                    "Data source '{}' is already being indexed",
                    id
                )));
            }
            sources.push(source);
        }

        let mut targets: Vec<BuildTarget> = Vec::with_capacity(sources.len());
        for source in sources {
            let marked = self
                .pipeline
                .registry
                .update_status(
                    source.id(),
                    source.version(),
                    SourceStatus::Indexing,
                    StatusFields::default(),
                )
                .await;

            match marked {
                Ok(updated) => targets.push(BuildTarget::new(
                    updated.id().clone(),
                    source.status(),
                    updated.version(),
                )),
                Err(e) => {
                    self.unlock_sources(&targets).await;
                    return Err(e);
                }
            }
        }

        Ok(targets)
    }

    async fn unlock_sources(&self, targets: &[BuildTarget]) {
        for target in targets {
            if let Err(e) = self
                .pipeline
                .registry
                .revert_indexing(&target.source_id, target.observed_version, target.prior_status)
                .await
            {
                error!(source_id = %target.source_id, error = %e, "Failed to release source lock");
            }
        }
    }

    async fn get_required(&self, id: &JobId) -> Result<IndexBuildJob, DomainError> {
        self.pipeline
            .jobs
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Build job '{}' not found", id)))
    }
}

#[async_trait]
impl IndexBuildOrchestrator for IndexBuildService {
    #[instrument(skip(self, request), fields(index_name = %request.name))]
    async fn submit(&self, request: BuildRequest) -> Result<IndexBuildJob, DomainError> {
        let spec = request.validate(&self.catalog)?;

        let _guard = self.submit_lock.lock().await;

        let jobs = self.pipeline.jobs.list().await?;
        self.ensure_name_available(&jobs, &spec)?;
        self.ensure_sources_idle(&jobs, &spec)?;
        let targets = self.lock_sources(&spec).await?;

        let job = match self
            .pipeline
            .jobs
            .create(IndexBuildJob::new(spec, targets.clone()))
            .await
        {
            Ok(job) => job,
            Err(e) => {
                self.unlock_sources(&targets).await;
                return Err(e);
            }
        };

        info!(
            job_id = %job.id(),
            sources = job.targets().len(),
            backend = %job.spec().backend,
            model = %job.spec().embedding_model.id,
            "Submitted index build"
        );

        let pipeline = self.pipeline.clone();
        let job_id = job.id().clone();
        tokio::spawn(async move { pipeline.run(job_id).await });

        Ok(job)
    }

    async fn get_progress(&self, id: &JobId) -> Result<IndexBuildJob, DomainError> {
        self.get_required(id).await
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn cancel(&self, id: &JobId) -> Result<IndexBuildJob, DomainError> {
        let job = self
            .pipeline
            .jobs
            .modify(
                id,
                Box::new(|job| {
                    job.request_cancel();
                    Ok(())
                }),
            )
            .await?;

        if job.is_terminal() {
            debug!(stage = %job.stage(), "Cancel ignored for terminal job");
        } else {
            info!(stage = %job.stage(), "Cancellation requested");
        }

        Ok(job)
    }

    async fn list_jobs(&self) -> Result<Vec<IndexBuildJob>, DomainError> {
        self.pipeline.jobs.list().await
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn purge(&self, id: &JobId) -> Result<(), DomainError> {
        let job = self.get_required(id).await?;

        if !job.is_terminal() {
            return Err(DomainError::conflict(format!(
                "Build job '{}' is still {}",
                id,
                job.stage()
            )));
        }

        self.pipeline.jobs.delete(id).await?;
        info!("Purged build job");
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, DomainError> {
        let retention = chrono::Duration::from_std(self.config.job_retention)
            .unwrap_or_else(|_| chrono::Duration::hours(24));

        let purged = self
            .pipeline
            .jobs
            .delete_terminal_before(Utc::now() - retention)
            .await?;

        if purged > 0 {
            info!(purged, "Purged expired build jobs");
        }
        Ok(purged)
    }

    async fn list_indices(&self) -> Result<Vec<IndexRecord>, DomainError> {
        let mut completed: Vec<IndexBuildJob> = self
            .pipeline
            .jobs
            .list()
            .await?
            .into_iter()
            .filter(|job| job.stage() == BuildStage::Completed)
            .collect();
        completed.sort_by_key(|job| std::cmp::Reverse(finished_at(job)));

        let mut seen = HashSet::new();
        Ok(completed
            .into_iter()
            .filter(|job| seen.insert(job.spec().name.clone()))
            .map(|job| IndexRecord {
                path: self.index_path(&job.spec().name),
                name: job.spec().name.clone(),
                backend: job.spec().backend,
                embedding_model: job.spec().embedding_model.id.clone(),
                source_ids: job.spec().source_ids.clone(),
                document_count: job.document_count(),
                created_at: finished_at(&job),
                job_id: job.id().clone(),
            })
            .collect())
    }
}

fn finished_at(job: &IndexBuildJob) -> DateTime<Utc> {
    job.completed_at().unwrap_or_else(|| job.created_at())
}

fn same_sources(a: &[SourceId], b: &[SourceId]) -> bool {
    a.len() == b.len() && a.iter().all(|id| b.contains(id))
}

/// Writes sub-stage progress onto the stored job
struct JobProgress {
    jobs: Arc<dyn IndexJobRepository>,
    job_id: JobId,
}

#[async_trait]
impl ProgressSink for JobProgress {
    async fn report(&self, fraction: f64) {
        let result = self
            .jobs
            .modify(
                &self.job_id,
                Box::new(move |job| {
                    job.report_sub_progress(fraction);
                    Ok(())
                }),
            )
            .await;

        if let Err(e) = result {
            debug!(job_id = %self.job_id, error = %e, "Dropped progress update");
        }
    }
}

impl Pipeline {
    #[instrument(skip(self), fields(job_id = %job_id))]
    async fn run(self: Arc<Self>, job_id: JobId) {
        let started = Instant::now();

        let _permit = match self.permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                self.finish_failed(&job_id, format!("Build scheduler closed: {}", e))
                    .await;
                return;
            }
        };

        let outcome = match self.execute(&job_id).await {
            Ok(Outcome::Completed) => self.finish_completed(&job_id).await.map(|_| "completed"),
            Ok(Outcome::Cancelled) => self.finish_cancelled(&job_id).await.map(|_| "cancelled"),
            Err(e) => Err(e),
        };

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                self.finish_failed(&job_id, e.to_string()).await;
                "error"
            }
        };

        record_build_outcome(outcome, started.elapsed());
    }

    /// Advance unless a cancel is pending; returns false when cancelled
    async fn enter_stage(&self, job_id: &JobId, stage: BuildStage) -> Result<bool, DomainError> {
        let job = self
            .jobs
            .modify(
                job_id,
                Box::new(move |job| {
                    if job.cancel_requested() {
                        Ok(())
                    } else {
                        job.advance_to(stage)
                    }
                }),
            )
            .await?;

        if job.cancel_requested() {
            info!(stage = %job.stage(), "Build cancelled at stage boundary");
            return Ok(false);
        }

        record_build_stage(stage.as_str());
        debug!(stage = %stage, progress = job.progress_percent(), "Entered build stage");
        Ok(true)
    }

    async fn execute(&self, job_id: &JobId) -> Result<Outcome, DomainError> {
        let job = self.load_job(job_id).await?;
        let spec = job.spec().clone();
        let progress = JobProgress {
            jobs: self.jobs.clone(),
            job_id: job_id.clone(),
        };

        if !self.enter_stage(job_id, BuildStage::EmbeddingModelLoad).await? {
            return Ok(Outcome::Cancelled);
        }
        let embedder = self.builder.load_embedding_model(&spec.embedding_model).await?;

        if !self.enter_stage(job_id, BuildStage::DocumentProcessing).await? {
            return Ok(Outcome::Cancelled);
        }
        let mut sources: Vec<DataSource> = Vec::with_capacity(spec.source_ids.len());
        for id in &spec.source_ids {
            sources.push(self.registry.get(id).await?);
        }
        let corpus = self
            .builder
            .process_documents(&sources, &spec.chunking, &progress)
            .await?;

        let counts = corpus.item_counts();
        self.jobs
            .modify(
                job_id,
                Box::new(move |job| {
                    for (source_id, count) in counts {
                        if let Some(target) = job.target_mut(&source_id) {
                            target.item_count = count;
                        }
                    }
                    Ok(())
                }),
            )
            .await?;

        if !self.enter_stage(job_id, BuildStage::VectorIndexBuild).await? {
            return Ok(Outcome::Cancelled);
        }
        let staged = self
            .builder
            .build_vector_index(&spec, &corpus, embedder.as_ref(), &progress)
            .await?;

        if !self.enter_stage(job_id, BuildStage::Finalize).await? {
            debug!(entries = staged.entry_count(), "Discarded staged index");
            return Ok(Outcome::Cancelled);
        }
        self.builder.finalize(staged).await?;

        Ok(Outcome::Completed)
    }

    async fn finish_completed(&self, job_id: &JobId) -> Result<(), DomainError> {
        let job = self.load_job(job_id).await?;
        let now = Utc::now();

        for target in job.targets() {
            let write = SourceWrite::Ready {
                item_count: target.item_count,
                at: now,
            };
            self.write_source(job_id, target, &write).await?;
        }

        let job = self
            .jobs
            .modify(job_id, Box::new(|job| job.advance_to(BuildStage::Completed)))
            .await?;

        record_build_stage(BuildStage::Completed.as_str());
        info!(documents = job.document_count(), "Index build completed");
        Ok(())
    }

    async fn load_job(&self, job_id: &JobId) -> Result<IndexBuildJob, DomainError> {
        self.jobs
            .get(job_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Build job '{}' not found", job_id)))
    }

    /// Sources are restored before the job turns terminal
    async fn finish_cancelled(&self, job_id: &JobId) -> Result<(), DomainError> {
        let job = self.load_job(job_id).await?;

        for target in job.targets() {
            let write = SourceWrite::Revert(target.prior_status);
            if let Err(e) = self.write_source(job_id, target, &write).await {
                error!(source_id = %target.source_id, error = %e, "Failed to restore source after cancel");
            }
        }

        self.jobs
            .modify(job_id, Box::new(|job| job.mark_cancelled()))
            .await?;

        record_build_stage(BuildStage::Cancelled.as_str());
        info!("Index build cancelled");
        Ok(())
    }

    async fn finish_failed(&self, job_id: &JobId, message: String) {
        warn!(error = %message, "Index build failed");

        match self.load_job(job_id).await {
            Ok(job) => {
                for target in job.targets() {
                    let write = SourceWrite::Failed(message.clone());
                    if let Err(e) = self.write_source(job_id, target, &write).await {
                        error!(source_id = %target.source_id, error = %e, "Failed to mark source as failed");
                    }
                }
            }
            Err(e) => error!(error = %e, "Failed to load job targets"),
        }

        if let Err(e) = self
            .jobs
            .modify(job_id, Box::new(move |job| job.fail(message)))
            .await
        {
            error!(error = %e, "Failed to record build failure");
            return;
        }

        record_build_stage(BuildStage::Error.as_str());
    }

    /// Apply a status write, re-reading the source after version conflicts
    async fn write_source(
        &self,
        job_id: &JobId,
        target: &BuildTarget,
        write: &SourceWrite,
    ) -> Result<DataSource, DomainError> {
        let id = &target.source_id;
        let mut expected = target.observed_version;
        let mut attempt = 0;

        let written = loop {
            attempt += 1;

            let result = match write {
                SourceWrite::Ready { item_count, at } => {
                    let fields = StatusFields {
                        item_count: Some(*item_count),
                        last_indexed: Some(*at),
                        error_message: None,
                    };
                    self.registry
                        .update_status(id, expected, SourceStatus::Ready, fields)
                        .await
                }
                SourceWrite::Failed(message) => {
                    let fields = StatusFields {
                        error_message: Some(message.clone()),
                        ..Default::default()
                    };
                    self.registry
                        .update_status(id, expected, SourceStatus::Error, fields)
                        .await
                }
                SourceWrite::Revert(status) => {
                    self.registry.revert_indexing(id, expected, *status).await
                }
            };

            match result {
                Ok(source) => break source,
                Err(e) if e.is_conflict() && attempt < MAX_STATUS_WRITE_ATTEMPTS => {
                    let current = self.registry.get(id).await?;
                    if current.status() != SourceStatus::Indexing {
                        return Err(e);
                    }

                    warn!(
                        source_id = %id,
                        expected,
                        found = current.version(),
                        attempt,
                        "Source changed during build, retrying status write"
                    );
                    expected = current.version();
                }
                Err(e) => return Err(e),
            }
        };

        let version = written.version();
        let source_id = id.clone();
        self.jobs
            .modify(
                job_id,
                Box::new(move |job| {
                    if let Some(target) = job.target_mut(&source_id) {
                        target.observed_version = version;
                    }
                    Ok(())
                }),
            )
            .await?;

        Ok(written)
    }
}
