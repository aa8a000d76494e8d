//! Running the action named by a node's metadata
//!
//! The executor is the error boundary between handlers and the engine: a
//! handler that fails, panics, times out or is cancelled never propagates an
//! error. It only yields an [`ActionOutcome`] the controller uses to decide
//! whether the instance may auto-advance.

use crate::config::EngineConfig;
use crate::workflow::actions::ActionDescriptor;
use crate::workflow::template::substitute_params;
use crate::workflow::{
    ActionContext, ActionError, ActionHandlerRegistry, InstanceStore, WorkflowDefinition,
    WorkflowId, WorkflowNode,
};
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Result of attempting a node's action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// No usable descriptor or no handler registered for it
    Skipped,
    /// Handler ran and its results were merged
    Completed,
    /// Handler returned an error, panicked or timed out
    Failed,
    /// Cancellation fired before the handler finished
    Cancelled,
}

impl ActionOutcome {
    /// Whether an action ran to completion
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Whether a handler was resolved and invoked
    pub fn was_invoked(&self) -> bool {
        !matches!(self, Self::Skipped)
    }
}

/// Executes node actions against the handler registry
#[derive(Debug, Clone)]
pub struct ActionExecutor {
    registry: Arc<ActionHandlerRegistry>,
    instances: Arc<InstanceStore>,
    action_timeout: Duration,
}

impl ActionExecutor {
    /// Create an executor writing results into `instances`
    pub fn new(
        registry: Arc<ActionHandlerRegistry>,
        instances: Arc<InstanceStore>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            registry,
            instances,
            action_timeout: config.action_timeout,
        }
    }

    /// Handler registry used for resolution
    pub fn registry(&self) -> &Arc<ActionHandlerRegistry> {
        &self.registry
    }

    /// Run the action embedded in `node`, if any.
    ///
    /// Parameters are templated from the instance variables before the call.
    /// Returned values are merged only when the handler completes; a failed
    /// or cancelled action leaves the variables untouched.
    pub async fn execute(
        &self,
        workflow_id: &WorkflowId,
        node: &WorkflowNode,
        definition: &Arc<WorkflowDefinition>,
        cancel: &CancellationToken,
    ) -> ActionOutcome {
        let Some(descriptor) = node.json_metadata.as_deref().and_then(ActionDescriptor::parse)
        else {
            if node.json_metadata.is_some() {
                tracing::debug!(
                    "Node {} metadata is not an action descriptor, skipping",
                    node.id
                );
            }
            return ActionOutcome::Skipped;
        };

        let context = ActionContext::new(
            workflow_id.clone(),
            node.clone(),
            Arc::clone(definition),
            Arc::clone(&self.instances),
        );

        let Some(handler) = self.registry.resolve(&descriptor.action, &context) else {
            tracing::warn!(
                workflow_id = %workflow_id,
                node_id = %node.id,
                action = %descriptor.action,
                "No handler registered for action"
            );
            return ActionOutcome::Skipped;
        };

        if cancel.is_cancelled() {
            return ActionOutcome::Cancelled;
        }

        let params = substitute_params(&descriptor.params, &self.instances.variables(workflow_id));
        tracing::debug!(
            workflow_id = %workflow_id,
            node_id = %node.id,
            action = %descriptor.action,
            "Executing action"
        );

        let invocation = AssertUnwindSafe(handler.handle(&context, &params, cancel)).catch_unwind();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = tokio::time::timeout(self.action_timeout, invocation) => Some(result),
        };

        let failure = match result {
            None | Some(Ok(Ok(Err(ActionError::Cancelled)))) => {
                tracing::info!(
                    workflow_id = %workflow_id,
                    node_id = %node.id,
                    action = %descriptor.action,
                    "Action cancelled"
                );
                return ActionOutcome::Cancelled;
            }
            Some(Ok(Ok(Ok(output)))) => {
                if cancel.is_cancelled() {
                    return ActionOutcome::Cancelled;
                }
                if let Some(values) = output {
                    self.instances.merge_variables(workflow_id, values);
                }
                return ActionOutcome::Completed;
            }
            Some(Ok(Ok(Err(error)))) => error.to_string(),
            Some(Ok(Err(panic))) => format!("handler panicked: {}", panic_message(&*panic)),
            Some(Err(_)) => ActionError::Timeout {
                timeout: self.action_timeout,
            }
            .to_string(),
        };

        tracing::error!(
            workflow_id = %workflow_id,
            node_id = %node.id,
            action = %descriptor.action,
            "Action failed: {}",
            failure
        );
        ActionOutcome::Failed
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
