//! Built per-source vector indices

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::domain::embedding::{EmbeddingModelSpec, cosine_similarity};
use crate::domain::index_build::BackendKind;
use crate::domain::source::SourceId;

/// One embedded chunk
#[derive(Debug, Clone, Serialize)]
pub struct IndexEntry {
    pub id: String,
    pub content: String,
    pub metadata: HashMap<String, Value>,
    #[serde(skip)]
    pub vector: Vec<f32>,
}

impl IndexEntry {
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(Value::as_str)
    }
}

/// A candidate returned by [`SourceIndex::search`]
#[derive(Debug, Clone, Copy)]
pub struct ScoredEntry<'a> {
    pub entry: &'a IndexEntry,
    pub score: f32,
}

/// The index built for one source by one job
#[derive(Debug, Clone)]
pub struct SourceIndex {
    pub source_id: SourceId,
    pub index_name: String,
    pub backend: BackendKind,
    pub embedding_model: EmbeddingModelSpec,
    pub entries: Vec<IndexEntry>,
    pub built_at: DateTime<Utc>,
}

impl SourceIndex {
    pub fn new(
        source_id: SourceId,
        index_name: impl Into<String>,
        backend: BackendKind,
        embedding_model: EmbeddingModelSpec,
        entries: Vec<IndexEntry>,
    ) -> Self {
        Self {
            source_id,
            index_name: index_name.into(),
            backend,
            embedding_model,
            entries,
            built_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Two-phase nearest neighbour search.
    ///
    /// Entries are first ranked by how many non-zero dimensions they share
    /// with the query and the best `complexity` of them are kept; those
    /// candidates are then re-scored by exact cosine similarity.
    pub fn search(&self, query: &[f32], top_k: usize, complexity: usize) -> Vec<ScoredEntry<'_>> {
        if top_k == 0 || self.entries.is_empty() {
            return Vec::new();
        }

        let pool = complexity.max(top_k);
        let mut candidates: Vec<(usize, usize)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, shared_dimensions(query, &entry.vector)))
            .collect();

        if candidates.len() > pool {
            // stable sort keeps insertion order among equal overlaps
            candidates.sort_by(|a, b| b.1.cmp(&a.1));
            candidates.truncate(pool);
        }

        let mut scored: Vec<ScoredEntry<'_>> = candidates
            .into_iter()
            .map(|(i, _)| {
                let entry = &self.entries[i];
                ScoredEntry {
                    entry,
                    score: cosine_similarity(query, &entry.vector),
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);
        scored
    }
}

fn shared_dimensions(a: &[f32], b: &[f32]) -> usize {
    a.iter()
        .zip(b.iter())
        .filter(|(x, y)| **x != 0.0 && **y != 0.0)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, vector: Vec<f32>) -> IndexEntry {
        IndexEntry {
            id: id.to_string(),
            content: format!("content of {}", id),
            metadata: HashMap::from([("title".to_string(), Value::from(id))]),
            vector,
        }
    }

    fn index() -> SourceIndex {
        SourceIndex::new(
            SourceId::new("docs").unwrap(),
            "docs",
            BackendKind::Hnsw,
            EmbeddingModelSpec::new("m1", 3),
            vec![
                entry("a", vec![1.0, 0.0, 0.0]),
                entry("b", vec![0.7, 0.7, 0.0]),
                entry("c", vec![0.0, 0.0, 1.0]),
            ],
        )
    }

    #[test]
    fn test_search_orders_by_score() {
        let index = index();
        let hits = index.search(&[1.0, 0.0, 0.0], 3, 10);

        let ids: Vec<&str> = hits.iter().map(|h| h.entry.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_search_respects_top_k() {
        let index = index();
        assert_eq!(index.search(&[1.0, 1.0, 1.0], 2, 10).len(), 2);
        assert!(index.search(&[1.0, 0.0, 0.0], 0, 10).is_empty());
    }

    #[test]
    fn test_complexity_limits_candidate_pool() {
        let index = index();

        // only "b" shares two dimensions with the query
        let hits = index.search(&[1.0, 0.5, 0.0], 1, 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entry.id, "b");
    }

    #[test]
    fn test_entry_title() {
        let index = index();
        assert_eq!(index.entries[0].title(), Some("a"));
        assert_eq!(index.len(), 3);
    }
}
