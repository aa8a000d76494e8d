//! Activity-diagram parser for workflows
//!
//! Turns PlantUML-style activity diagram text into a [`WorkflowDefinition`].
//! Parsing is tolerant: unrecognised lines are skipped and unterminated
//! constructs are closed at end of input. The only hard failure is an empty
//! source.

mod lexer;
mod lowering;
mod notes;

#[cfg(test)]
mod tests;

use crate::workflow::{WorkflowDefinition, WorkflowId};
use lexer::Lexer;
use lowering::GraphBuilder;
use thiserror::Error;

/// Errors that can occur during diagram parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Source text was empty or whitespace only
    #[error("Diagram source is empty")]
    EmptySource,
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Parser for activity diagrams
pub struct DiagramParser;

impl DiagramParser {
    /// Parse diagram text into a workflow definition.
    ///
    /// A blank or missing `id` is replaced by a generated one. A blank or
    /// missing `name` falls back to the diagram title, then to the id.
    pub fn parse(
        source: &str,
        id: Option<&str>,
        name: Option<&str>,
    ) -> ParseResult<WorkflowDefinition> {
        if source.trim().is_empty() {
            return Err(ParseError::EmptySource);
        }

        let tokens = Lexer::new(source).tokenize();
        let builder = GraphBuilder::new().lower(tokens);

        let id = id
            .and_then(|id| WorkflowId::try_new(id.trim()).ok())
            .unwrap_or_else(WorkflowId::generate);
        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .or_else(|| builder.title())
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string());

        let definition = builder.into_definition(id, name);
        tracing::debug!(
            "Parsed workflow {} with {} nodes and {} transitions",
            definition.id,
            definition.nodes.len(),
            definition.transitions.len()
        );
        Ok(definition)
    }
}
