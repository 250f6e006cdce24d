//! Source adapter registry - resolves the adapter for a source type

use std::collections::HashMap;
use std::sync::Arc;

use super::{BrowserAdapter, ChatAdapter, CodeAdapter, DocumentAdapter, EmailAdapter};
use crate::domain::DomainError;
use crate::domain::embedding::EmbeddingModelLoader;
use crate::domain::index_store::VectorIndexStore;
use crate::domain::search::SourceAdapter;
use crate::domain::source::SourceType;

/// Adapter instances keyed by the source type they serve
#[derive(Default)]
pub struct SourceAdapterRegistry {
    adapters: HashMap<SourceType, Arc<dyn SourceAdapter>>,
}

impl std::fmt::Debug for SourceAdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceAdapterRegistry")
            .field("source_types", &self.source_types())
            .finish()
    }
}

impl SourceAdapterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with an index-backed adapter for every source type
    pub fn with_defaults(
        store: Arc<dyn VectorIndexStore>,
        models: Arc<dyn EmbeddingModelLoader>,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DocumentAdapter::new(store.clone(), models.clone())));
        registry.register(Arc::new(EmailAdapter::new(store.clone(), models.clone())));
        registry.register(Arc::new(ChatAdapter::new(store.clone(), models.clone())));
        registry.register(Arc::new(CodeAdapter::new(store.clone(), models.clone())));
        registry.register(Arc::new(BrowserAdapter::new(store, models)));
        registry
    }

    /// Register an adapter, replacing any previous one for its type
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        self.adapters.insert(adapter.source_type(), adapter);
    }

    pub fn get(&self, source_type: SourceType) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters.get(&source_type).cloned()
    }

    /// Get the adapter for a type, returning error if none is registered
    pub fn get_required(&self, source_type: SourceType) -> Result<Arc<dyn SourceAdapter>, DomainError> {
        self.get(source_type).ok_or_else(|| {
            DomainError::configuration(format!(
                "No adapter registered for source type '{}'",
                source_type.as_str()
            ))
        })
    }

    /// Registered source types in declaration order
    pub fn source_types(&self) -> Vec<SourceType> {
        SourceType::ALL
            .iter()
            .copied()
            .filter(|t| self.adapters.contains_key(t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::MockSourceAdapter;
    use crate::infrastructure::embedding::HashingEmbedderLoader;
    use crate::infrastructure::index_store::InMemoryVectorIndexStore;

    #[test]
    fn test_defaults_cover_every_type() {
        let registry = SourceAdapterRegistry::with_defaults(
            Arc::new(InMemoryVectorIndexStore::new()),
            Arc::new(HashingEmbedderLoader::new()),
        );

        assert_eq!(registry.source_types(), SourceType::ALL.to_vec());
        for source_type in SourceType::ALL {
            assert_eq!(registry.get(source_type).unwrap().source_type(), source_type);
        }
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = SourceAdapterRegistry::new();
        assert!(registry.get_required(SourceType::Chat).is_err());

        let mut adapter = MockSourceAdapter::new();
        adapter.expect_source_type().return_const(SourceType::Chat);
        registry.register(Arc::new(adapter));

        assert!(registry.get_required(SourceType::Chat).is_ok());
        assert_eq!(registry.source_types(), vec![SourceType::Chat]);
    }
}
