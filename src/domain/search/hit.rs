//! Search results

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::highlight::TextSpan;
use crate::domain::source::{SourceId, SourceType};

/// Highlight spans of a hit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlights {
    /// Byte ranges into `content`
    pub content: Vec<TextSpan>,
    /// Byte ranges into `metadata.title`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub title: Vec<TextSpan>,
}

/// One ranked result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub content: String,
    pub score: f32,
    pub source: SourceType,
    pub source_id: SourceId,
    pub metadata: HashMap<String, Value>,
    #[serde(default)]
    pub highlights: Highlights,
}

impl SearchHit {
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        score: f32,
        source: SourceType,
        source_id: SourceId,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            score,
            source,
            source_id,
            metadata: HashMap::new(),
            highlights: Highlights::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(Value::as_str)
    }
}

/// Clamp a raw adapter score into `[0, 1]`; NaN becomes 0
pub fn clamp_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Why a source was left out of a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedReason {
    Timeout,
    Error,
}

/// A source excluded from a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegradedSource {
    pub source_id: SourceId,
    pub source_type: SourceType,
    pub reason: DegradedReason,
    pub message: String,
}

/// Result of a federated search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub degraded: Vec<DegradedSource>,
    pub total_count: usize,
    pub query: String,
    pub search_time_secs: f64,
    pub sources_queried: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(1.7), 1.0);
        assert_eq!(clamp_score(-0.2), 0.0);
        assert_eq!(clamp_score(f32::NAN), 0.0);
        assert_eq!(clamp_score(0.42), 0.42);
    }

    #[test]
    fn test_hit_title() {
        let hit = SearchHit::new(
            "h1",
            "body",
            0.5,
            SourceType::Email,
            SourceId::new("inbox").unwrap(),
        )
        .with_metadata(HashMap::from([(
            "title".to_string(),
            Value::from("Re: deadline"),
        )]));

        assert_eq!(hit.title(), Some("Re: deadline"));
    }

    #[test]
    fn test_degraded_reason_serialization() {
        let json = serde_json::to_string(&DegradedReason::Timeout).unwrap();
        assert_eq!(json, "\"timeout\"");
    }
}
