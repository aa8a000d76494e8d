//! Handlers that ship with the engine

use super::{ActionContext, ActionError, ActionHandler, ActionOutput, ActionResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Copies every parameter into the instance variables
#[derive(Debug, Clone, Copy, Default)]
pub struct SetVariableHandler;

#[async_trait]
impl ActionHandler for SetVariableHandler {
    fn name(&self) -> &str {
        "set_variable"
    }

    async fn handle(
        &self,
        _context: &ActionContext,
        params: &HashMap<String, String>,
        _cancel: &CancellationToken,
    ) -> ActionResult<ActionOutput> {
        Ok(Some(params.clone()))
    }
}

/// Writes `message` to the log at `level` (info, warn, error, debug)
#[derive(Debug, Clone, Copy, Default)]
pub struct LogHandler;

#[async_trait]
impl ActionHandler for LogHandler {
    fn name(&self) -> &str {
        "log"
    }

    async fn handle(
        &self,
        context: &ActionContext,
        params: &HashMap<String, String>,
        _cancel: &CancellationToken,
    ) -> ActionResult<ActionOutput> {
        let message = params
            .get("message")
            .ok_or_else(|| ActionError::invalid_parameter("message", "is required"))?;
        let workflow_id = context.workflow_id().as_str();
        let node_id = context.node().id.as_str();

        match params.get("level").map(|l| l.to_lowercase()).as_deref() {
            None | Some("info") => tracing::info!(workflow_id, node_id, "{}", message),
            Some("warn") | Some("warning") => tracing::warn!(workflow_id, node_id, "{}", message),
            Some("error") => tracing::error!(workflow_id, node_id, "{}", message),
            Some("debug") => tracing::debug!(workflow_id, node_id, "{}", message),
            Some(other) => {
                return Err(ActionError::invalid_parameter(
                    "level",
                    format!("unknown level '{}'", other),
                ))
            }
        }

        Ok(None)
    }
}

/// Sleeps for `seconds`, returning early with an error on cancellation
#[derive(Debug, Clone, Copy, Default)]
pub struct WaitHandler;

impl WaitHandler {
    fn duration(params: &HashMap<String, String>) -> ActionResult<Duration> {
        let raw = params
            .get("seconds")
            .ok_or_else(|| ActionError::invalid_parameter("seconds", "is required"))?;
        let seconds: f64 = raw
            .trim()
            .parse()
            .map_err(|_| ActionError::invalid_parameter("seconds", format!("'{}' is not a number", raw)))?;
        Duration::try_from_secs_f64(seconds).map_err(|_| {
            ActionError::invalid_parameter("seconds", format!("'{}' is not a valid duration", raw))
        })
    }
}

#[async_trait]
impl ActionHandler for WaitHandler {
    fn name(&self) -> &str {
        "wait"
    }

    async fn handle(
        &self,
        _context: &ActionContext,
        params: &HashMap<String, String>,
        cancel: &CancellationToken,
    ) -> ActionResult<ActionOutput> {
        let duration = Self::duration(params)?;
        if let Some(message) = params.get("message") {
            tracing::info!("Waiting: {}", message);
        }

        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(None),
            _ = cancel.cancelled() => Err(ActionError::Cancelled),
        }
    }
}
