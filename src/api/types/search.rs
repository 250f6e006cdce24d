//! Search request and response bodies

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::search::{DegradedSource, Highlights, SearchHit, SearchQuery, SearchResponse};

/// Body of `POST /search`; omitted knobs fall back to configured defaults
#[derive(Debug, Clone, Deserialize)]
pub struct SearchApiRequest {
    pub query: String,
    pub top_k: Option<usize>,
    #[serde(default)]
    pub sources: Vec<String>,
    pub complexity: Option<usize>,
    #[serde(default)]
    pub recompute_embeddings: bool,
    #[serde(default)]
    pub source_priority: Vec<String>,
    pub min_score: Option<f32>,
}

impl SearchApiRequest {
    pub fn into_query(self, default_top_k: usize, default_complexity: usize) -> SearchQuery {
        let mut query = SearchQuery::new(self.query, self.top_k.unwrap_or(default_top_k))
            .with_sources(self.sources)
            .with_complexity(self.complexity.unwrap_or(default_complexity))
            .with_source_priority(self.source_priority)
            .with_recompute_embeddings(self.recompute_embeddings);

        if let Some(min_score) = self.min_score {
            query = query.with_min_score(min_score);
        }

        query
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResultItem {
    pub id: String,
    pub content: String,
    pub score: f32,
    pub source: String,
    pub source_id: String,
    pub metadata: HashMap<String, Value>,
    pub highlights: Highlights,
}

impl From<SearchHit> for SearchResultItem {
    fn from(hit: SearchHit) -> Self {
        Self {
            id: hit.id,
            content: hit.content,
            score: hit.score,
            source: hit.source.as_str().to_string(),
            source_id: hit.source_id.to_string(),
            metadata: hit.metadata,
            highlights: hit.highlights,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchApiResponse {
    pub results: Vec<SearchResultItem>,
    pub total_count: usize,
    pub query: String,
    /// Seconds spent in the federation engine
    pub search_time: f64,
    pub degraded_sources: Vec<DegradedSource>,
    pub sources_queried: usize,
}

impl From<SearchResponse> for SearchApiResponse {
    fn from(response: SearchResponse) -> Self {
        Self {
            results: response.hits.into_iter().map(SearchResultItem::from).collect(),
            total_count: response.total_count,
            query: response.query,
            search_time: response.search_time_secs,
            degraded_sources: response.degraded,
            sources_queried: response.sources_queried,
        }
    }
}
