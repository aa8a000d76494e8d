//! Unified error handling for the chatflow library
//!
//! Engine entry points return [`ChatflowError`]; [`ParseError`] converts into
//! it. Action failures never leave the executor.

use crate::workflow::ParseError;
use thiserror::Error;

/// The main error type for the chatflow library
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatflowError {
    /// A required argument was missing or blank
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// Name of the offending argument
        name: String,
        /// Why the value was rejected
        reason: String,
    },

    /// No workflow definition is stored under the given id
    #[error("Unknown workflow: {0}")]
    WorkflowNotFound(String),

    /// Diagram source could not be parsed at all
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Persistence collaborator failed to read or write state
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl ChatflowError {
    /// Build an [`ChatflowError::InvalidArgument`] for a blank required value
    pub fn blank_argument(name: &str) -> Self {
        Self::InvalidArgument {
            name: name.to_string(),
            reason: "value cannot be empty or whitespace only".to_string(),
        }
    }

    /// Whether this error signals an unknown workflow id
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::WorkflowNotFound(_))
    }
}

/// Result type alias for chatflow operations
pub type Result<T> = std::result::Result<T, ChatflowError>;

/// Reject blank required string arguments
pub(crate) fn require_non_blank<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ChatflowError::blank_argument(name));
    }
    Ok(trimmed)
}
