//! Transition-related types for workflow graphs

use crate::workflow::NodeId;
use serde::{Deserialize, Serialize};

/// Directed, optionally labelled edge between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Identifier, unique within the definition
    pub id: String,
    /// Source node ID
    pub from_node_id: NodeId,
    /// Target node ID
    pub to_node_id: NodeId,
    /// Branch label (`yes`, `no`, `else`, loop condition) or `None` when unconditional
    pub condition: Option<String>,
}

impl Transition {
    /// Create a new transition
    pub fn new(
        id: impl Into<String>,
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        condition: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            from_node_id: from.into(),
            to_node_id: to.into(),
            condition,
        }
    }

    /// Whether the transition carries a non-empty condition
    pub fn is_conditional(&self) -> bool {
        self.condition
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.condition {
            Some(condition) => write!(
                f,
                "{} -> {} [{}]",
                self.from_node_id, self.to_node_id, condition
            ),
            None => write!(f, "{} -> {}", self.from_node_id, self.to_node_id),
        }
    }
}
