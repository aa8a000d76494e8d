//! Node-related types for workflow graphs

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kinds of workflow nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NodeKind {
    /// Action node declared as `:Label;`
    #[default]
    Action,
    /// Entry marker declared with `start`
    Start,
    /// Terminal marker declared with `stop`/`end`
    Stop,
    /// Synthesized branch source when an `if` has no predecessor
    Decision,
    /// Synthesized merge point closing an `if`
    Join,
    /// Synthesized target of a loop back-edge
    LoopEntry,
    /// Synthesized exit of a loop
    AfterLoop,
}

impl NodeKind {
    /// Get the string representation of the node kind
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Action => "action",
            NodeKind::Start => "start",
            NodeKind::Stop => "stop",
            NodeKind::Decision => "decision",
            NodeKind::Join => "join",
            NodeKind::LoopEntry => "loop_entry",
            NodeKind::AfterLoop => "after_loop",
        }
    }

    /// Whether the parser generated this node rather than the diagram declaring it
    pub fn is_synthetic(&self) -> bool {
        matches!(
            self,
            NodeKind::Decision | NodeKind::Join | NodeKind::LoopEntry | NodeKind::AfterLoop
        )
    }
}

/// Errors that can occur when creating node-related types
#[derive(Debug, Error)]
pub enum NodeError {
    /// Node ID cannot be empty or whitespace only
    #[error("Node ID cannot be empty or whitespace only")]
    EmptyNodeId,
}

/// Result type for node operations
pub type NodeResult<T> = Result<T, NodeError>;

/// Unique identifier for a node within one definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Create a new node ID
    ///
    /// # Panics
    /// Panics if the ID is empty or whitespace only. For non-panicking creation,
    /// use `try_new` instead.
    pub fn new(id: impl Into<String>) -> Self {
        Self::try_new(id).expect("Node ID cannot be empty or whitespace only")
    }

    /// Create a new node ID, returning an error for invalid input
    pub fn try_new(id: impl Into<String>) -> NodeResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(NodeError::EmptyNodeId);
        }
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A step in the workflow graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowNode {
    /// Stable identifier, unique within the definition
    pub id: NodeId,
    /// Human-visible node name
    pub label: String,
    /// Action descriptor `{"action": ..., "params": {...}}` taken from a note
    pub json_metadata: Option<String>,
    /// Free-text guidance shown to the user
    pub note_markdown: Option<String>,
    /// What declared or synthesized this node
    #[serde(default)]
    pub kind: NodeKind,
}

impl WorkflowNode {
    /// Create a node without note content
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            json_metadata: None,
            note_markdown: None,
            kind,
        }
    }

    /// Text shown when this node is the current prompt
    pub fn display_text(&self) -> &str {
        self.note_markdown.as_deref().unwrap_or(&self.label)
    }

    /// Whether the node carries an action descriptor
    pub fn has_action(&self) -> bool {
        self.json_metadata
            .as_deref()
            .is_some_and(|json| json.trim_start().starts_with('{'))
    }
}

/// Entry node declared by the diagram's initial marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartPoint {
    /// Node the workflow enters through
    pub node_id: NodeId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_creation() {
        let id1 = NodeId::new("node_1");
        let id2 = NodeId::from("node_1");
        let id3: NodeId = "node_1".into();

        assert_eq!(id1, id2);
        assert_eq!(id2, id3);
        assert_eq!(id1.as_str(), "node_1");
    }

    #[test]
    fn test_node_id_try_new_empty_error() {
        assert!(NodeId::try_new("").is_err());
        assert!(NodeId::try_new("   ").is_err());
        assert!(NodeId::try_new("\t\n").is_err());
    }

    #[test]
    #[should_panic(expected = "Node ID cannot be empty or whitespace only")]
    fn test_node_id_new_panics_on_empty() {
        NodeId::new("");
    }

    #[test]
    fn test_display_text_prefers_note() {
        let mut node = WorkflowNode::new("node_1", "Ask name", NodeKind::Action);
        assert_eq!(node.display_text(), "Ask name");

        node.note_markdown = Some("Please tell us your **name**".to_string());
        assert_eq!(node.display_text(), "Please tell us your **name**");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(NodeKind::Join.as_str(), "join");
        assert_eq!(NodeKind::LoopEntry.as_str(), "loop_entry");
        assert_eq!(NodeKind::AfterLoop.as_str(), "after_loop");
        assert!(NodeKind::Join.is_synthetic());
        assert!(!NodeKind::Start.is_synthetic());
    }

    #[test]
    fn test_node_serialization() {
        let mut node = WorkflowNode::new("node_2", "Take photo", NodeKind::Action);
        node.json_metadata = Some(r#"{"action":"camera"}"#.to_string());

        let serialized = serde_json::to_string(&node).unwrap();
        let deserialized: WorkflowNode = serde_json::from_str(&serialized).unwrap();
        assert_eq!(node, deserialized);
        assert!(deserialized.has_action());
    }
}
