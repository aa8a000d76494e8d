//! # Chatflow
//!
//! A workflow engine that drives guided, chat-style experiences from
//! PlantUML-like activity diagrams.
//!
//! ## Features
//!
//! - **Diagram Parsing**: Lower activity-diagram text (actions, branches, loops, notes)
//!   into an executable graph, tolerating malformed input
//! - **State Calculation**: Derive the next prompt or choice set for a running instance
//! - **Actions**: Run named side-effect handlers embedded in node notes, with
//!   `{{variable}}` templating and automatic advancing
//! - **Concurrency**: Definition and instance stores are safe to share across tasks
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatflow::workflow::{ActionHandlerRegistry, ChoiceValue, WorkflowController};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> chatflow::Result<()> {
//! let controller = WorkflowController::new(Arc::new(ActionHandlerRegistry::with_builtins()));
//! let cancel = CancellationToken::new();
//!
//! let diagram = r#"
//! start
//! :Welcome;
//! if (ready?) then (yes)
//!   :Begin;
//! else (no)
//!   :Later;
//! endif
//! stop
//! "#;
//!
//! let id = controller
//!     .import_workflow(diagram, Some("onboarding"), None, &cancel)
//!     .await?;
//! let payload = controller.get_current_state_payload(id.as_str())?;
//! println!("{:?}", payload);
//!
//! controller
//!     .advance_by_choice_value(id.as_str(), Some(ChoiceValue::Index(0)), &cancel)
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Shared utilities
pub mod common;

/// Engine configuration loaded from the environment
pub mod config;

/// Error types used throughout the library
pub mod error;

/// Workflow engine: parsing, state calculation, actions and orchestration
pub mod workflow;

pub use config::EngineConfig;
pub use error::{ChatflowError, Result};
pub use workflow::{
    ActionHandler, ActionHandlerRegistry, ChoiceValue, DiagramParser, NodeId, Transition,
    WorkflowController, WorkflowDefinition, WorkflowId, WorkflowNode, WorkflowStatePayload,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
