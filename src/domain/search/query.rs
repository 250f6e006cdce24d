//! Federated search query

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Maximum accepted query length in characters
pub const MAX_QUERY_CHARS: usize = 2048;

/// A federated search request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub top_k: usize,
    /// Source ids or type names; empty selects every source
    #[serde(default)]
    pub sources: Vec<String>,
    /// Candidate pool size kept before exact re-scoring
    pub complexity: usize,
    /// Source ids or type names used to order equal scores
    #[serde(default)]
    pub source_priority: Vec<String>,
    #[serde(default)]
    pub recompute_embeddings: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f32>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, top_k: usize) -> Self {
        Self {
            text: text.into(),
            top_k,
            sources: Vec::new(),
            complexity: 32,
            source_priority: Vec::new(),
            recompute_embeddings: false,
            min_score: None,
        }
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_complexity(mut self, complexity: usize) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_source_priority(mut self, priority: Vec<String>) -> Self {
        self.source_priority = priority;
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }

    pub fn with_recompute_embeddings(mut self, recompute: bool) -> Self {
        self.recompute_embeddings = recompute;
        self
    }

    /// Reject malformed input
    pub fn validate(&self, max_top_k: usize) -> Result<(), DomainError> {
        if self.text.trim().is_empty() {
            return Err(DomainError::validation("Query text cannot be empty"));
        }

        if self.text.chars().count() > MAX_QUERY_CHARS {
            return Err(DomainError::validation(format!(
                "Query text exceeds maximum length of {} characters",
                MAX_QUERY_CHARS
            )));
        }

        if self.top_k == 0 {
            return Err(DomainError::validation("top_k must be greater than 0"));
        }

        if self.top_k > max_top_k {
            return Err(DomainError::validation(format!(
                "top_k must not exceed {}",
                max_top_k
            )));
        }

        if self.complexity == 0 {
            return Err(DomainError::validation("complexity must be greater than 0"));
        }

        if let Some(min_score) = self.min_score {
            if !(0.0..=1.0).contains(&min_score) {
                return Err(DomainError::validation(
                    "min_score must be between 0.0 and 1.0",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_query() {
        let query = SearchQuery::new("deadline", 5)
            .with_sources(vec!["email".into(), "document".into()])
            .with_complexity(64);
        assert!(query.validate(100).is_ok());
    }

    #[test]
    fn test_rejects_empty_text() {
        assert!(SearchQuery::new("  ", 5).validate(100).is_err());
    }

    #[test]
    fn test_rejects_long_text() {
        let text = "a".repeat(MAX_QUERY_CHARS + 1);
        assert!(SearchQuery::new(text, 5).validate(100).is_err());

        let text = "a".repeat(MAX_QUERY_CHARS);
        assert!(SearchQuery::new(text, 5).validate(100).is_ok());
    }

    #[test]
    fn test_rejects_bad_top_k() {
        assert!(SearchQuery::new("q", 0).validate(100).is_err());
        assert!(SearchQuery::new("q", 101).validate(100).is_err());
    }

    #[test]
    fn test_rejects_zero_complexity() {
        let query = SearchQuery::new("q", 5).with_complexity(0);
        assert!(query.validate(100).is_err());
    }

    #[test]
    fn test_rejects_min_score_out_of_range() {
        assert!(SearchQuery::new("q", 5).with_min_score(1.5).validate(100).is_err());
        assert!(SearchQuery::new("q", 5).with_min_score(f32::NAN).validate(100).is_err());
        assert!(SearchQuery::new("q", 5).with_min_score(0.3).validate(100).is_ok());
    }
}
