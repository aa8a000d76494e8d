//! Workflow definition type and structural validation

use crate::workflow::{NodeId, StartPoint, Transition, WorkflowNode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur when creating definition-related types
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// Workflow ID cannot be empty or whitespace only
    #[error("Workflow ID cannot be empty or whitespace only")]
    EmptyWorkflowId,
}

/// Result type for definition operations
pub type DefinitionResult<T> = Result<T, DefinitionError>;

/// Identifier of a workflow definition and of its running instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkflowId(String);

impl WorkflowId {
    /// Create a new workflow ID
    ///
    /// # Panics
    /// Panics if the ID is empty or whitespace only. For non-panicking creation,
    /// use `try_new` instead.
    pub fn new(id: impl Into<String>) -> Self {
        Self::try_new(id).expect("Workflow ID cannot be empty or whitespace only")
    }

    /// Create a new workflow ID, returning an error for invalid input
    pub fn try_new(id: impl Into<String>) -> DefinitionResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DefinitionError::EmptyWorkflowId);
        }
        Ok(Self(id))
    }

    /// Generate a fresh, unique workflow ID
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkflowId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WorkflowId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parsed, immutable workflow graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Workflow ID
    pub id: WorkflowId,
    /// Human-readable name
    pub name: String,
    /// Nodes in declaration order
    pub nodes: Vec<WorkflowNode>,
    /// Transitions in declaration order
    pub transitions: Vec<Transition>,
    /// Entry nodes declared by `start`
    pub start_points: Vec<StartPoint>,
}

impl WorkflowDefinition {
    /// Create an empty definition
    pub fn new(id: WorkflowId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            nodes: Vec::new(),
            transitions: Vec::new(),
            start_points: Vec::new(),
        }
    }

    /// Look up a node by ID
    pub fn node(&self, id: &NodeId) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    /// Find the first node carrying the given label
    pub fn node_by_label(&self, label: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|node| node.label == label)
    }

    /// Outgoing transitions of a node, in declaration order
    pub fn outgoing<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Transition> + 'a {
        self.transitions
            .iter()
            .filter(move |transition| &transition.from_node_id == id)
    }

    /// Declared entry node: the first start point, otherwise the first node
    pub fn start_node_id(&self) -> Option<&NodeId> {
        self.start_points
            .first()
            .map(|start| &start.node_id)
            .or_else(|| self.nodes.first().map(|node| &node.id))
    }

    /// Validate the graph invariants, collecting every violation
    pub fn validate_structure(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.id.as_str().trim().is_empty() {
            errors.push("Workflow ID cannot be empty".to_string());
        }

        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(&node.id) {
                errors.push(format!("Duplicate node ID '{}'", node.id));
            }
        }

        for (index, transition) in self.transitions.iter().enumerate() {
            if !seen.contains(&transition.from_node_id) {
                errors.push(format!(
                    "Transition #{} ({}) references non-existent source node '{}'",
                    index, transition.id, transition.from_node_id
                ));
            }
            if !seen.contains(&transition.to_node_id) {
                errors.push(format!(
                    "Transition #{} ({}) references non-existent target node '{}'",
                    index, transition.id, transition.to_node_id
                ));
            }
        }

        for start in &self.start_points {
            if !seen.contains(&start.node_id) {
                errors.push(format!(
                    "Start point references non-existent node '{}'",
                    start.node_id
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::test_helpers::*;

    #[test]
    fn test_workflow_id_validation() {
        assert!(WorkflowId::try_new("").is_err());
        assert!(WorkflowId::try_new("  ").is_err());
        assert_eq!(WorkflowId::try_new("intake").unwrap().as_str(), "intake");
        assert_ne!(WorkflowId::generate(), WorkflowId::generate());
    }

    #[test]
    fn test_validation_success() {
        let definition = create_linear_definition();
        assert!(definition.validate_structure().is_ok());
    }

    #[test]
    fn test_validation_dangling_transition() {
        let mut definition = create_linear_definition();
        definition
            .transitions
            .push(create_transition("t_99", "node_1", "missing", None));

        let errors = definition.validate_structure().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("non-existent target node 'missing'"));
    }

    #[test]
    fn test_validation_duplicate_node_and_bad_start() {
        let mut definition = create_linear_definition();
        definition.nodes.push(create_node("node_1", "Again"));
        definition.start_points.push(StartPoint {
            node_id: NodeId::new("ghost"),
        });

        let errors = definition.validate_structure().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("Duplicate node ID 'node_1'")));
        assert!(errors.iter().any(|e| e.contains("Start point")));
    }

    #[test]
    fn test_outgoing_preserves_declaration_order() {
        let mut definition = create_linear_definition();
        definition
            .transitions
            .push(create_transition("t_3", "node_1", "node_3", Some("skip")));

        let node_1 = NodeId::new("node_1");
        let targets: Vec<_> = definition
            .outgoing(&node_1)
            .map(|t| t.to_node_id.as_str())
            .collect();
        assert_eq!(targets, vec!["node_2", "node_3"]);
    }

    #[test]
    fn test_start_node_falls_back_to_first_node() {
        let mut definition = create_linear_definition();
        assert_eq!(definition.start_node_id().unwrap().as_str(), "node_1");

        definition.start_points.push(StartPoint {
            node_id: NodeId::new("node_2"),
        });
        assert_eq!(definition.start_node_id().unwrap().as_str(), "node_2");

        let empty = WorkflowDefinition::new(WorkflowId::new("empty"), "Empty");
        assert!(empty.start_node_id().is_none());
    }
}
