//! Search federation service - fans a query out to every ready source

use std::cmp::Ordering;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use super::source_service::{SourceFilter, SourceRegistry};
use crate::domain::error::DomainError;
use crate::domain::search::{
    DegradedReason, DegradedSource, Highlights, SearchHit, SearchQuery, SearchResponse,
    clamp_score, find_spans,
};
use crate::domain::source::{DataSource, SourceStatus};
use crate::infrastructure::adapters::SourceAdapterRegistry;
use crate::infrastructure::observability::{record_adapter_call, record_search};

/// Search configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Deadline for a single adapter call
    pub adapter_timeout: Duration,
    /// Upper bound on concurrent adapter calls per search
    pub max_concurrency: usize,
    pub max_top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            adapter_timeout: Duration::from_millis(5000),
            max_concurrency: 8,
            max_top_k: 100,
        }
    }
}

/// Trait for the federation engine (for dynamic dispatch in AppState)
#[async_trait]
pub trait SearchFederation: Send + Sync + Debug {
    /// Ranked hits across ready sources; adapter faults degrade, never fail
    async fn search(&self, query: SearchQuery) -> Result<SearchResponse, DomainError>;
}

/// Federation engine over the adapter registry
pub struct SearchService {
    registry: Arc<dyn SourceRegistry>,
    adapters: Arc<SourceAdapterRegistry>,
    config: SearchConfig,
}

impl Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("adapters", &self.adapters)
            .field("config", &self.config)
            .finish()
    }
}

/// Hit plus the keys that order equal scores
struct Ranked {
    hit: SearchHit,
    priority: usize,
    order: usize,
    position: usize,
}

type Dispatch = (usize, DataSource, Result<Vec<SearchHit>, (DegradedReason, String)>);

impl SearchService {
    pub fn new(
        registry: Arc<dyn SourceRegistry>,
        adapters: Arc<SourceAdapterRegistry>,
        config: SearchConfig,
    ) -> Self {
        Self {
            registry,
            adapters,
            config,
        }
    }

    async fn ready_sources(&self, query: &SearchQuery) -> Result<Vec<DataSource>, DomainError> {
        let ready = self
            .registry
            .list(&SourceFilter::with_statuses(vec![SourceStatus::Ready]))
            .await?;

        Ok(ready
            .into_iter()
            .filter(|source| {
                query.sources.is_empty()
                    || query.sources.iter().any(|s| source.matches_selector(s))
            })
            .collect())
    }

    async fn dispatch(&self, order: usize, source: DataSource, query: &SearchQuery) -> Dispatch {
        let source_type = source.source_type();
        let started = Instant::now();

        let adapter = match self.adapters.get_required(source_type) {
            Ok(adapter) => adapter,
            Err(e) => return (order, source, Err((DegradedReason::Error, e.to_string()))),
        };

        let result =
            match tokio::time::timeout(self.config.adapter_timeout, adapter.search(&source, query))
                .await
            {
                Ok(Ok(hits)) => {
                    record_adapter_call(source_type.as_str(), "ok", started.elapsed());
                    Ok(hits)
                }
                Ok(Err(e)) => {
                    record_adapter_call(source_type.as_str(), "error", started.elapsed());
                    warn!(source_id = %source.id(), error = %e, "Source adapter failed");
                    Err((DegradedReason::Error, e.to_string()))
                }
                Err(_) => {
                    record_adapter_call(source_type.as_str(), "timeout", started.elapsed());
                    warn!(
                        source_id = %source.id(),
                        timeout_ms = self.config.adapter_timeout.as_millis() as u64,
                        "Source adapter timed out"
                    );
                    Err((
                        DegradedReason::Timeout,
                        format!(
                            "No response within {} ms",
                            self.config.adapter_timeout.as_millis()
                        ),
                    ))
                }
            };

        (order, source, result)
    }
}

/// Rank of the first priority entry selecting `source`
fn priority_of(source: &DataSource, priority: &[String]) -> usize {
    priority
        .iter()
        .position(|entry| source.matches_selector(entry))
        .unwrap_or(priority.len())
}

fn highlight(mut hit: SearchHit, needle: &str) -> SearchHit {
    let title = hit.title().map(|t| find_spans(t, needle)).unwrap_or_default();

    hit.highlights = Highlights {
        content: find_spans(&hit.content, needle),
        title,
    };
    hit
}

#[async_trait]
impl SearchFederation for SearchService {
    #[instrument(skip(self, query), fields(top_k = query.top_k, complexity = query.complexity))]
    async fn search(&self, query: SearchQuery) -> Result<SearchResponse, DomainError> {
        query.validate(self.config.max_top_k)?;
        let started = Instant::now();

        let sources = self.ready_sources(&query).await?;
        let sources_queried = sources.len();
        let concurrency = sources_queried.min(self.config.max_concurrency).max(1);

        debug!(sources = sources_queried, concurrency, "Dispatching search");

        let mut results: Vec<Dispatch> = stream::iter(
            sources
                .into_iter()
                .enumerate()
                .map(|(order, source)| self.dispatch(order, source, &query)),
        )
        .buffer_unordered(concurrency)
        .collect()
        .await;
        results.sort_by_key(|(order, _, _)| *order);

        let mut ranked = Vec::new();
        let mut degraded = Vec::new();

        for (order, source, result) in results {
            match result {
                Ok(hits) => {
                    let priority = priority_of(&source, &query.source_priority);

                    for (position, mut hit) in hits.into_iter().take(query.top_k).enumerate() {
                        hit.score = clamp_score(hit.score);
                        if query.min_score.is_some_and(|min| hit.score < min) {
                            continue;
                        }

                        ranked.push(Ranked {
                            hit,
                            priority,
                            order,
                            position,
                        });
                    }
                }
                Err((reason, message)) => degraded.push(DegradedSource {
                    source_id: source.id().clone(),
                    source_type: source.source_type(),
                    reason,
                    message,
                }),
            }
        }

        ranked.sort_by(|a, b| {
            b.hit
                .score
                .partial_cmp(&a.hit.score)
                .unwrap_or(Ordering::Equal)
                .then(a.priority.cmp(&b.priority))
                .then(a.order.cmp(&b.order))
                .then(a.position.cmp(&b.position))
        });
        ranked.truncate(query.top_k);

        let hits: Vec<SearchHit> = ranked
            .into_iter()
            .map(|r| highlight(r.hit, &query.text))
            .collect();

        let elapsed = started.elapsed();
        record_search(sources_queried, degraded.len(), hits.len(), elapsed);
        info!(
            hits = hits.len(),
            degraded = degraded.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Search completed"
        );

        Ok(SearchResponse {
            total_count: hits.len(),
            hits,
            degraded,
            query: query.text,
            search_time_secs: elapsed.as_secs_f64(),
            sources_queried,
        })
    }
}
