use crate::diagram::load_definition;
use crate::exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_WARNING};
use anyhow::Result;
use chatflow::workflow::{NodeId, WorkflowDefinition};
use colored::*;
use std::collections::{HashSet, VecDeque};
use std::path::Path;

/// Problems found in a lowered graph
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn check(definition: &WorkflowDefinition) -> Self {
        let errors = definition.validate_structure().err().unwrap_or_default();
        let warnings = unreachable_nodes(definition)
            .into_iter()
            .map(|node_id| format!("Node '{}' is not reachable from the entry node", node_id))
            .collect();
        Self { errors, warnings }
    }

    pub fn exit_code(&self) -> i32 {
        if !self.errors.is_empty() {
            EXIT_ERROR
        } else if !self.warnings.is_empty() {
            EXIT_WARNING
        } else {
            EXIT_SUCCESS
        }
    }
}

fn unreachable_nodes(definition: &WorkflowDefinition) -> Vec<NodeId> {
    let Some(start) = definition.start_node_id().cloned() else {
        return Vec::new();
    };

    let mut seen = HashSet::from([start.clone()]);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for transition in definition.outgoing(&current) {
            if seen.insert(transition.to_node_id.clone()) {
                queue.push_back(transition.to_node_id.clone());
            }
        }
    }

    definition
        .nodes
        .iter()
        .filter(|node| !seen.contains(&node.id))
        .map(|node| node.id.clone())
        .collect()
}

pub fn run_validate_command(file: &Path, quiet: bool) -> Result<i32> {
    let definition = load_definition(file)?;
    let report = ValidationReport::check(&definition);

    for error in &report.errors {
        println!("  {} {}", "ERROR".red(), error);
    }
    if !quiet {
        for warning in &report.warnings {
            println!("  {} {}", "WARN".yellow(), warning);
        }
    }

    let code = report.exit_code();
    if code == EXIT_ERROR {
        println!("\n{} {} failed validation.", "✗".red(), file.display());
    } else if code == EXIT_WARNING {
        println!("\n{} {} is valid with warnings.", "⚠".yellow(), file.display());
    } else if !quiet {
        println!(
            "{} {} is valid ({} nodes, {} transitions).",
            "✓".green(),
            file.display(),
            definition.nodes.len(),
            definition.transitions.len()
        );
    }
    Ok(code)
}
