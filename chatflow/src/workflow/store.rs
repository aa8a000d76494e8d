//! Concurrent storage of parsed workflow definitions

use crate::workflow::{WorkflowDefinition, WorkflowId};
use crate::{ChatflowError, Result};
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe map from workflow id to its immutable definition.
///
/// Definitions are shared through `Arc`, so readers keep a consistent graph
/// even if the id is re-imported while they hold it.
#[derive(Debug, Default)]
pub struct DefinitionStore {
    definitions: DashMap<WorkflowId, Arc<WorkflowDefinition>>,
}

impl DefinitionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the definition stored under its id
    pub fn store(&self, definition: WorkflowDefinition) -> Arc<WorkflowDefinition> {
        let definition = Arc::new(definition);
        if self
            .definitions
            .insert(definition.id.clone(), Arc::clone(&definition))
            .is_some()
        {
            tracing::debug!("Replaced stored definition for workflow {}", definition.id);
        }
        definition
    }

    /// Fetch a definition, failing with [`ChatflowError::WorkflowNotFound`]
    pub fn get(&self, id: &WorkflowId) -> Result<Arc<WorkflowDefinition>> {
        self.definitions
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| ChatflowError::WorkflowNotFound(id.to_string()))
    }

    /// Whether a definition is stored under `id`
    pub fn contains(&self, id: &WorkflowId) -> bool {
        self.definitions.contains_key(id)
    }

    /// Remove a definition, returning it if present
    pub fn remove(&self, id: &WorkflowId) -> Option<Arc<WorkflowDefinition>> {
        self.definitions.remove(id).map(|(_, definition)| definition)
    }

    /// All stored ids, sorted
    pub fn ids(&self) -> Vec<WorkflowId> {
        let mut ids: Vec<_> = self.definitions.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Number of stored definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
