//! Pluggable side-effect handlers invoked from node metadata
//!
//! A node whose note carries `{"action": "<name>", "params": {...}}` names an
//! [`ActionHandler`] registered in the [`ActionHandlerRegistry`]. Handlers
//! receive an [`ActionContext`] giving them the instance they run for.

mod builtin;
mod registry;

pub use builtin::{LogHandler, SetVariableHandler, WaitHandler};
pub use registry::{ActionHandlerRegistry, HandlerFactory};

use crate::workflow::{InstanceStore, VariableBag, WorkflowDefinition, WorkflowId, WorkflowNode};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors that can occur during action execution
#[derive(Debug, Error)]
pub enum ActionError {
    /// Handler reported a failure
    #[error("Action execution failed: {0}")]
    ExecutionFailed(String),
    /// A parameter was missing or malformed
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Why the value was rejected
        reason: String,
    },
    /// Handler did not finish in time
    #[error("Action execution timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded
        timeout: Duration,
    },
    /// Cancellation was requested while the handler ran
    #[error("Action execution was cancelled")]
    Cancelled,
    /// IO error during action execution
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON error during action execution
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ActionError {
    /// Build an [`ActionError::InvalidParameter`]
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for action operations
pub type ActionResult<T> = Result<T, ActionError>;

/// Result key/value pairs a handler hands back to the instance
pub type ActionOutput = Option<HashMap<String, String>>;

/// An externally supplied, name-addressed side effect
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Name the handler is addressed by in node metadata
    fn name(&self) -> &str;

    /// Run the action.
    ///
    /// Returned pairs are merged into the instance variables. Long-running
    /// handlers should stop promptly once `cancel` fires.
    async fn handle(
        &self,
        context: &ActionContext,
        params: &HashMap<String, String>,
        cancel: &CancellationToken,
    ) -> ActionResult<ActionOutput>;
}

/// Everything a handler may know about the call it serves
#[derive(Clone)]
pub struct ActionContext {
    workflow_id: WorkflowId,
    node: WorkflowNode,
    definition: Arc<WorkflowDefinition>,
    instances: Arc<InstanceStore>,
}

impl ActionContext {
    /// Create a context for running `node` of `workflow_id`
    pub fn new(
        workflow_id: WorkflowId,
        node: WorkflowNode,
        definition: Arc<WorkflowDefinition>,
        instances: Arc<InstanceStore>,
    ) -> Self {
        Self {
            workflow_id,
            node,
            definition,
            instances,
        }
    }

    /// Workflow the action runs for
    pub fn workflow_id(&self) -> &WorkflowId {
        &self.workflow_id
    }

    /// Node whose metadata named the action
    pub fn node(&self) -> &WorkflowNode {
        &self.node
    }

    /// Definition the node belongs to
    pub fn definition(&self) -> &WorkflowDefinition {
        &self.definition
    }

    /// Read an instance variable, ignoring case
    pub fn get_variable(&self, name: &str) -> Option<String> {
        self.instances.get_variable(&self.workflow_id, name)
    }

    /// Write an instance variable immediately
    pub fn set_variable(&self, name: impl Into<String>, value: impl Into<String>) {
        self.instances.set_variable(&self.workflow_id, name, value);
    }

    /// Snapshot of the instance variables
    pub fn variables(&self) -> VariableBag {
        self.instances.variables(&self.workflow_id)
    }
}

impl std::fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("workflow_id", &self.workflow_id)
            .field("node", &self.node.id)
            .finish()
    }
}

#[derive(Deserialize)]
struct RawDescriptor {
    action: String,
    #[serde(default)]
    params: Option<HashMap<String, Value>>,
}

/// Parsed `{"action": ..., "params": {...}}` note metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    /// Handler name
    pub action: String,
    /// Parameters before template substitution
    pub params: HashMap<String, String>,
}

impl ActionDescriptor {
    /// Parse node metadata.
    ///
    /// Returns `None` unless the text is an object with a non-blank string
    /// `action` and, when present, a flat `params` object. Numbers and
    /// booleans in `params` are accepted as their JSON text; `null` becomes
    /// an empty string.
    pub fn parse(json: &str) -> Option<Self> {
        let raw: RawDescriptor = serde_json::from_str(json).ok()?;
        let action = raw.action.trim();
        if action.is_empty() {
            return None;
        }

        let mut params = HashMap::new();
        for (key, value) in raw.params.unwrap_or_default() {
            let value = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                Value::Bool(_) | Value::Number(_) => value.to_string(),
                Value::Array(_) | Value::Object(_) => return None,
            };
            params.insert(key, value);
        }

        Some(Self {
            action: action.to_string(),
            params,
        })
    }
}
