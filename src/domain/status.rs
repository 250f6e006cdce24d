//! System readiness snapshot

use serde::{Deserialize, Serialize};

/// Overall readiness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemState {
    Ready,
    NoIndex,
    Error,
}

impl SystemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::NoIndex => "no_index",
            Self::Error => "error",
        }
    }
}

/// Snapshot derived from the registry, the job store and the index store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub status: SystemState,
    pub index_loaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_path: Option<String>,
    pub total_documents: u64,
    pub backend_name: String,
    pub embedding_model: String,
    pub ready_sources: usize,
    pub indexing_sources: usize,
    pub error_sources: usize,
    pub active_builds: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serialization() {
        assert_eq!(
            serde_json::to_string(&SystemState::NoIndex).unwrap(),
            "\"no_index\""
        );
        assert_eq!(SystemState::Ready.as_str(), "ready");
    }
}
