//! Loading diagram files and the read-only `parse` and `export` commands

use crate::cli::ParseFormat;
use anyhow::{Context, Result};
use chatflow::workflow::{DiagramParser, MermaidExporter, NodeId, WorkflowDefinition};
use colored::*;
use std::path::{Path, PathBuf};

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// Workflow id derived from the file name, used when none is given
pub fn default_id(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().trim().to_string())
        .filter(|stem| !stem.is_empty())
}

/// Read a diagram file as text
pub fn read_source(path: &Path) -> Result<String> {
    let path = expand_home(path);
    std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read diagram '{}'", path.display()))
}

/// Read and parse a diagram file, naming it after the file stem
pub fn load_definition(path: &Path) -> Result<WorkflowDefinition> {
    let source = read_source(path)?;
    let id = default_id(path);
    DiagramParser::parse(&source, id.as_deref(), None)
        .with_context(|| format!("Failed to parse diagram '{}'", path.display()))
}

pub fn run_parse_command(file: &Path, format: ParseFormat) -> Result<()> {
    let definition = load_definition(file)?;
    match format {
        ParseFormat::Json => println!("{}", serde_json::to_string_pretty(&definition)?),
        ParseFormat::Text => print!("{}", render_text(&definition)),
    }
    Ok(())
}

pub fn run_export_command(file: &Path, highlight: Option<String>) -> Result<()> {
    let definition = load_definition(file)?;
    let mut exporter = MermaidExporter::new();
    if let Some(node_id) = highlight {
        let node_id = NodeId::try_new(node_id)?;
        if definition.node(&node_id).is_none() {
            tracing::warn!("Highlighted node '{}' is not part of the diagram", node_id);
        }
        exporter = exporter.with_highlight(node_id);
    }
    println!("{}", exporter.export(&definition));
    Ok(())
}

/// Human-readable listing of a lowered graph
pub fn render_text(definition: &WorkflowDefinition) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {} ({})\n",
        "Workflow:".bold(),
        definition.name,
        definition.id
    ));

    out.push_str(&format!("\n{}\n", "Nodes:".bold()));
    for node in &definition.nodes {
        let mut line = format!(
            "  {:<16} {:<11} {}",
            node.id.as_str(),
            node.kind.as_str(),
            node.label
        );
        if node.json_metadata.is_some() {
            line.push_str(&format!(" {}", "[json]".cyan()));
        }
        if node.note_markdown.is_some() {
            line.push_str(&format!(" {}", "[note]".cyan()));
        }
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str(&format!("\n{}\n", "Transitions:".bold()));
    for transition in &definition.transitions {
        let condition = transition
            .condition
            .as_deref()
            .map(|condition| format!(" [{}]", condition).yellow().to_string())
            .unwrap_or_default();
        out.push_str(&format!(
            "  {:<8} {} -> {}{}\n",
            transition.id, transition.from_node_id, transition.to_node_id, condition
        ));
    }

    if !definition.start_points.is_empty() {
        out.push_str(&format!("\n{}\n", "Start points:".bold()));
        for start in &definition.start_points {
            out.push_str(&format!("  {}\n", start.node_id));
        }
    }

    out
}
