//! Test helper functions for workflow module
//!
//! This module provides common test utilities to reduce code duplication
//! across workflow tests.

#![cfg(test)]

use crate::workflow::{
    ActionContext, ActionHandler, ActionResult, NodeKind, Transition, WorkflowDefinition,
    WorkflowId, WorkflowNode,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Test helper to create an action node
pub fn create_node(id: &str, label: &str) -> WorkflowNode {
    WorkflowNode::new(id, label, NodeKind::Action)
}

/// Test helper to create an action node carrying an action descriptor
pub fn create_action_node(id: &str, label: &str, json: &str) -> WorkflowNode {
    let mut node = create_node(id, label);
    node.json_metadata = Some(json.to_string());
    node
}

/// Test helper to create a transition
pub fn create_transition(id: &str, from: &str, to: &str, condition: Option<&str>) -> Transition {
    Transition::new(id, from, to, condition.map(str::to_string))
}

/// Test helper to create a definition `node_1 -> node_2 -> node_3`
pub fn create_linear_definition() -> WorkflowDefinition {
    let mut definition = WorkflowDefinition::new(WorkflowId::new("linear"), "Linear");
    definition.nodes.push(create_node("node_1", "First"));
    definition.nodes.push(create_node("node_2", "Second"));
    definition.nodes.push(create_node("node_3", "Third"));
    definition
        .transitions
        .push(create_transition("t_1", "node_1", "node_2", None));
    definition
        .transitions
        .push(create_transition("t_2", "node_2", "node_3", None));
    definition
}

/// Test helper to create a definition where `node_1` fans out to three targets
pub fn create_branching_definition() -> WorkflowDefinition {
    let mut definition = WorkflowDefinition::new(WorkflowId::new("branching"), "Branching");
    definition.nodes.push(create_node("node_1", "Pick"));
    definition.nodes.push(create_node("node_2", "Red"));
    definition.nodes.push(create_node("node_3", "Green"));
    definition.nodes.push(create_node("node_4", "Blue"));
    definition
        .transitions
        .push(create_transition("t_1", "node_1", "node_2", Some("red")));
    definition
        .transitions
        .push(create_transition("t_2", "node_1", "node_3", Some("green")));
    definition
        .transitions
        .push(create_transition("t_3", "node_1", "node_4", Some("blue")));
    definition
}

/// Handler that records its calls and echoes its params back as results
#[derive(Default)]
pub struct RecordingHandler {
    /// Number of invocations
    pub calls: AtomicUsize,
}

impl RecordingHandler {
    /// Create a shared recording handler
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of invocations so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ActionHandler for RecordingHandler {
    fn name(&self) -> &str {
        "record"
    }

    async fn handle(
        &self,
        _context: &ActionContext,
        params: &HashMap<String, String>,
        _cancel: &CancellationToken,
    ) -> ActionResult<Option<HashMap<String, String>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(params.clone()))
    }
}
