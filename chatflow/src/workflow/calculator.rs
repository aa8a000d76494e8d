//! Start-node and prompt calculation over a workflow graph

use crate::workflow::{NodeId, Transition, WorkflowDefinition};
use serde::{Deserialize, Serialize};

/// One selectable outgoing path of a choice prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Zero-based position among the node's outgoing transitions
    pub index: usize,
    /// Target label, or the raw target id when the target is unknown
    pub display_text: String,
    /// Node the choice leads to
    pub target_node_id: NodeId,
    /// Condition of the underlying transition
    pub condition: Option<String>,
}

/// What the presentation layer should show for the current node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStatePayload {
    /// Whether the caller must pick one of `choices`
    pub is_choice: bool,
    /// Prompt text for non-choice nodes
    pub text: Option<String>,
    /// Choices in transition declaration order
    pub choices: Vec<Choice>,
}

impl WorkflowStatePayload {
    /// Payload showing plain text
    pub fn text(text: Option<String>) -> Self {
        Self {
            is_choice: false,
            text,
            choices: Vec::new(),
        }
    }

    /// Payload asking the caller to pick a path
    pub fn choice(choices: Vec<Choice>) -> Self {
        Self {
            is_choice: true,
            text: None,
            choices,
        }
    }
}

/// Pure functions deciding where an instance starts and what it shows
pub struct StateCalculator;

impl StateCalculator {
    /// Effective start node.
    ///
    /// Begins at the declared entry (first start point, else first node) and
    /// hops once if that node has exactly one outgoing transition.
    pub fn calculate_start_node(definition: &WorkflowDefinition) -> Option<NodeId> {
        let entry = definition.start_node_id()?;
        let outgoing: Vec<&Transition> = definition.outgoing(entry).collect();

        match outgoing.as_slice() {
            [only] => Some(only.to_node_id.clone()),
            _ => Some(entry.clone()),
        }
    }

    /// Prompt for the node `current`.
    ///
    /// A node with two or more outgoing transitions, or any conditional one,
    /// becomes a choice. Otherwise the node's note markdown (else its label)
    /// is shown; an unknown node yields no text.
    pub fn calculate_current_payload(
        definition: &WorkflowDefinition,
        current: &NodeId,
    ) -> WorkflowStatePayload {
        let outgoing: Vec<&Transition> = definition.outgoing(current).collect();
        let needs_choice = outgoing.len() >= 2 || outgoing.iter().any(|t| t.is_conditional());

        if !needs_choice {
            let text = definition
                .node(current)
                .map(|node| node.display_text().to_string());
            return WorkflowStatePayload::text(text);
        }

        let choices = outgoing
            .into_iter()
            .enumerate()
            .map(|(index, transition)| Choice {
                index,
                display_text: definition
                    .node(&transition.to_node_id)
                    .map(|node| node.label.clone())
                    .unwrap_or_else(|| transition.to_node_id.to_string()),
                target_node_id: transition.to_node_id.clone(),
                condition: transition.condition.clone(),
            })
            .collect();

        WorkflowStatePayload::choice(choices)
    }
}
