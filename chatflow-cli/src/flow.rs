//! Interactive `run` command: steps a diagram instance from stdin

use crate::diagram::{default_id, expand_home, read_source};
use anyhow::{bail, Result};
use chatflow::config::EngineConfig;
use chatflow::workflow::{
    ActionHandlerRegistry, ChoiceValue, FileSystemPersistence, WorkflowController,
    WorkflowStatePayload,
};
use colored::*;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

/// Arguments of the `run` command
#[derive(Debug)]
pub struct RunOptions {
    pub file: PathBuf,
    pub id: Option<String>,
    pub vars: Vec<String>,
    pub state_dir: Option<PathBuf>,
    pub restart: bool,
}

/// How an interactive session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    /// A node without outgoing transitions was reached
    Completed,
    /// Input closed before the workflow finished
    EndOfInput,
    /// Interrupted by the user
    Cancelled,
}

/// Main entry point for the run command
pub async fn run_flow_command(options: RunOptions) -> Result<FlowOutcome> {
    let variables = parse_vars(&options.vars)?;
    let source = read_source(&options.file)?;

    let config = EngineConfig::global().clone();
    let state_dir = options
        .state_dir
        .as_deref()
        .map(expand_home)
        .or_else(|| config.state_dir.clone());

    let mut controller = WorkflowController::with_config(
        Arc::new(ActionHandlerRegistry::with_builtins()),
        config,
    );
    if let Some(dir) = state_dir {
        tracing::debug!("Persisting workflow state under {}", dir.display());
        controller = controller.with_persistence(Arc::new(FileSystemPersistence::new(dir)));
    }

    let cancel = CancellationToken::new();
    let ct = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            ct.cancel();
        }
    });

    let id = options.id.or_else(|| default_id(&options.file));
    let workflow_id = controller
        .import_workflow(&source, id.as_deref(), None, &cancel)
        .await?;
    if options.restart {
        controller
            .restart_instance(workflow_id.as_str(), &cancel)
            .await?;
    }
    for (name, value) in &variables {
        controller.set_variable(workflow_id.as_str(), name, value)?;
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    step_loop(&controller, workflow_id.as_str(), stdin, &mut stdout, &cancel).await
}

/// Split `key=value` arguments
pub fn parse_vars(vars: &[String]) -> Result<Vec<(String, String)>> {
    vars.iter()
        .map(|var| match var.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => bail!("Invalid variable format: '{}'. Use key=value format.", var),
        })
        .collect()
}

/// Interpret a line of user input as a choice
pub fn parse_choice(line: &str) -> Option<ChoiceValue> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(match trimmed.parse::<i64>() {
        Ok(index) => ChoiceValue::Index(index),
        Err(_) => ChoiceValue::Text(trimmed.to_string()),
    })
}

/// Prompt, read and advance until the workflow ends, input closes, or
/// `cancel` fires
pub async fn step_loop<R, W>(
    controller: &WorkflowController,
    workflow_id: &str,
    input: R,
    out: &mut W,
    cancel: &CancellationToken,
) -> Result<FlowOutcome>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut steps = 0usize;

    loop {
        let payload = controller.get_current_state_payload(workflow_id)?;
        render_payload(&payload, out)?;

        if is_finished(controller, workflow_id)? {
            writeln!(out, "{} Workflow complete after {} steps.", "✓".green(), steps)?;
            return Ok(FlowOutcome::Completed);
        }

        write!(out, "{} ", ">".bold())?;
        out.flush()?;

        let line = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                writeln!(out)?;
                return Ok(FlowOutcome::Cancelled);
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            tracing::debug!("Input closed after {} steps", steps);
            return Ok(FlowOutcome::EndOfInput);
        };

        let choice = parse_choice(&line);
        if controller
            .advance_by_choice_value(workflow_id, choice, cancel)
            .await?
        {
            steps += 1;
        } else {
            writeln!(out, "{} No path matches '{}'", "⚠".yellow(), line.trim())?;
        }
    }
}

fn is_finished(controller: &WorkflowController, workflow_id: &str) -> Result<bool> {
    let Some(current) = controller.current_node_id(workflow_id)? else {
        return Ok(true);
    };
    let definition = controller.definition(workflow_id)?;
    let finished = definition.outgoing(&current).next().is_none();
    Ok(finished)
}

fn render_payload<W: Write>(payload: &WorkflowStatePayload, out: &mut W) -> Result<()> {
    if payload.is_choice {
        for choice in &payload.choices {
            let condition = choice
                .condition
                .as_deref()
                .map(|condition| format!(" ({})", condition).dimmed().to_string())
                .unwrap_or_default();
            writeln!(
                out,
                "  [{}] {}{}",
                choice.index.to_string().cyan(),
                choice.display_text,
                condition
            )?;
        }
    } else {
        match &payload.text {
            Some(text) => writeln!(out, "{}", text)?,
            None => writeln!(out, "{}", "(no prompt)".dimmed())?,
        }
    }
    Ok(())
}
