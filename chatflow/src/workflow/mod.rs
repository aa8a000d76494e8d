//! Workflow engine data structures and components
//!
//! Activity-diagram text is lowered by [`DiagramParser`] into a
//! [`WorkflowDefinition`]. The [`WorkflowController`] stores definitions,
//! keeps per-instance state, asks the [`StateCalculator`] what to show and
//! runs node actions through the [`ActionExecutor`].

mod actions;
mod calculator;
mod controller;
mod definition;
mod executor;
mod instance;
mod node;
mod parser;
mod persistence;
mod store;
mod template;
#[cfg(test)]
mod test_helpers;
mod transition;
mod visualization;

pub use actions::{
    ActionContext, ActionDescriptor, ActionError, ActionHandler, ActionHandlerRegistry,
    ActionOutput, ActionResult, HandlerFactory, LogHandler, SetVariableHandler, WaitHandler,
};
pub use calculator::{Choice, StateCalculator, WorkflowStatePayload};
pub use controller::{ChoiceValue, WorkflowController};
pub use definition::{DefinitionError, DefinitionResult, WorkflowDefinition, WorkflowId};
pub use executor::{ActionExecutor, ActionOutcome};
pub use instance::{InstanceState, InstanceStore, VariableBag};
pub use node::{NodeError, NodeId, NodeKind, NodeResult, StartPoint, WorkflowNode};
pub use parser::{DiagramParser, ParseError, ParseResult};
pub use persistence::{
    DefinitionSnapshot, FileSystemPersistence, MemoryPersistence, WorkflowPersistence,
};
pub use store::DefinitionStore;
pub use template::{substitute_params, substitute_variables};
pub use transition::Transition;
pub use visualization::MermaidExporter;
