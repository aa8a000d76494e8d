//! Per-instance runtime state: current node and variables

use crate::workflow::{NodeId, WorkflowId};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// String variables with case-insensitive names.
///
/// The spelling used on the most recent write is kept for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct VariableBag {
    entries: HashMap<String, (String, String)>,
}

impl VariableBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str) -> String {
        name.to_lowercase()
    }

    /// Look up a variable, ignoring case
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&Self::key(name))
            .map(|(_, value)| value.as_str())
    }

    /// Insert or overwrite a variable, returning the previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        self.entries
            .insert(Self::key(&name), (name, value.into()))
            .map(|(_, previous)| previous)
    }

    /// Merge all pairs, overwriting existing names
    pub fn merge<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in values {
            self.set(name, value);
        }
    }

    /// Remove a variable, ignoring case
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(&Self::key(name)).map(|(_, value)| value)
    }

    /// Iterate `(name, value)` pairs in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bag is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy into a map keyed by display name, sorted
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }
}

impl From<BTreeMap<String, String>> for VariableBag {
    fn from(map: BTreeMap<String, String>) -> Self {
        let mut bag = Self::new();
        bag.merge(map);
        bag
    }
}

impl From<VariableBag> for BTreeMap<String, String> {
    fn from(bag: VariableBag) -> Self {
        bag.to_map()
    }
}

/// Runtime state of one workflow instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceState {
    /// Node the instance currently sits on; `None` before start
    pub current_node_id: Option<NodeId>,
    /// Variables written by actions and callers
    pub variables: VariableBag,
}

/// Concurrent map from workflow id to its instance state.
///
/// Each update runs under the shard lock of its id, so concurrent writes to
/// the same instance are never lost and instances never observe each other.
#[derive(Debug, Default)]
pub struct InstanceStore {
    instances: DashMap<WorkflowId, InstanceState>,
}

impl InstanceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Move an instance to `node_id`, creating the instance if needed
    pub fn set_current_node(&self, id: &WorkflowId, node_id: NodeId) {
        self.instances.entry(id.clone()).or_default().current_node_id = Some(node_id);
    }

    /// Current node of an instance
    pub fn current_node(&self, id: &WorkflowId) -> Option<NodeId> {
        self.instances
            .get(id)
            .and_then(|state| state.current_node_id.clone())
    }

    /// Read one variable, ignoring case
    pub fn get_variable(&self, id: &WorkflowId, name: &str) -> Option<String> {
        self.instances
            .get(id)
            .and_then(|state| state.variables.get(name).map(str::to_string))
    }

    /// Write one variable, creating the instance if needed
    pub fn set_variable(&self, id: &WorkflowId, name: impl Into<String>, value: impl Into<String>) {
        self.instances
            .entry(id.clone())
            .or_default()
            .variables
            .set(name, value);
    }

    /// Merge several variables atomically with respect to other writers
    pub fn merge_variables<I, K, V>(&self, id: &WorkflowId, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.instances
            .entry(id.clone())
            .or_default()
            .variables
            .merge(values);
    }

    /// Snapshot of an instance's variables
    pub fn variables(&self, id: &WorkflowId) -> VariableBag {
        self.instances
            .get(id)
            .map(|state| state.variables.clone())
            .unwrap_or_default()
    }

    /// Snapshot of the whole instance state
    pub fn snapshot(&self, id: &WorkflowId) -> Option<InstanceState> {
        self.instances.get(id).map(|state| state.clone())
    }

    /// Drop an instance entirely
    pub fn clear(&self, id: &WorkflowId) {
        self.instances.remove(id);
    }

    /// Whether an instance exists for `id`
    pub fn contains(&self, id: &WorkflowId) -> bool {
        self.instances.contains_key(id)
    }

    /// Number of tracked instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether no instance is tracked
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
