//! Orchestration of import, start and choice-driven advancing
//!
//! [`WorkflowController`] owns the definition and instance stores and is the
//! only component that moves instances between nodes. All methods take
//! `&self`, so a controller can be shared behind an `Arc` by many tasks.
//! Calls for different workflow ids never interfere. Racing calls on the
//! same id resolve as last-write-wins on the current node.

use crate::config::EngineConfig;
use crate::error::require_non_blank;
use crate::workflow::{
    ActionExecutor, ActionHandlerRegistry, DefinitionSnapshot, DefinitionStore, DiagramParser,
    InstanceStore, NodeId, StateCalculator, Transition, WorkflowDefinition, WorkflowId,
    WorkflowPersistence, WorkflowStatePayload,
};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Caller input selecting one outgoing transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    /// Zero-based position in the outgoing transition list
    Index(i64),
    /// Target node id, target label, or a numeric index as text
    Text(String),
}

impl From<i64> for ChoiceValue {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for ChoiceValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ChoiceValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Pick the target of `value` among `outgoing`.
///
/// Text is tried as a target node id, then as a target label, then as a
/// numeric index. An integer is an index. No value (or blank text) selects
/// the only transition when there is exactly one.
fn resolve_choice(
    definition: &WorkflowDefinition,
    outgoing: &[&Transition],
    value: Option<&ChoiceValue>,
) -> Option<NodeId> {
    let by_index = |index: i64| {
        usize::try_from(index)
            .ok()
            .and_then(|index| outgoing.get(index))
            .map(|transition| transition.to_node_id.clone())
    };
    let only = || match outgoing {
        [transition] => Some(transition.to_node_id.clone()),
        _ => None,
    };

    match value {
        None => only(),
        Some(ChoiceValue::Index(index)) => by_index(*index),
        Some(ChoiceValue::Text(text)) if text.trim().is_empty() => only(),
        Some(ChoiceValue::Text(text)) => outgoing
            .iter()
            .find(|t| t.to_node_id.as_str() == text)
            .or_else(|| {
                outgoing.iter().find(|t| {
                    definition
                        .node(&t.to_node_id)
                        .is_some_and(|node| node.label == *text)
                })
            })
            .map(|t| t.to_node_id.clone())
            .or_else(|| text.trim().parse::<i64>().ok().and_then(by_index)),
    }
}

/// Drives workflow instances through their definitions
pub struct WorkflowController {
    definitions: DefinitionStore,
    instances: Arc<InstanceStore>,
    executor: ActionExecutor,
    persistence: Option<Arc<dyn WorkflowPersistence>>,
    config: EngineConfig,
}

impl WorkflowController {
    /// Create a controller using the global configuration
    pub fn new(registry: Arc<ActionHandlerRegistry>) -> Self {
        Self::with_config(registry, EngineConfig::global().clone())
    }

    /// Create a controller with explicit configuration
    pub fn with_config(registry: Arc<ActionHandlerRegistry>, config: EngineConfig) -> Self {
        let instances = Arc::new(InstanceStore::new());
        let executor = ActionExecutor::new(registry, Arc::clone(&instances), &config);
        Self {
            definitions: DefinitionStore::new(),
            instances,
            executor,
            persistence: None,
            config,
        }
    }

    /// Attach a persistence collaborator
    pub fn with_persistence(mut self, persistence: Arc<dyn WorkflowPersistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Configuration in effect
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Handler registry used by the executor
    pub fn registry(&self) -> &Arc<ActionHandlerRegistry> {
        self.executor.registry()
    }

    /// Parse and store a diagram, then start its instance.
    ///
    /// Any previous in-memory instance under the same id is discarded. The
    /// definition is handed to persistence after the instance starts.
    pub async fn import_workflow(
        &self,
        source: &str,
        id: Option<&str>,
        name: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<WorkflowId> {
        require_non_blank("source", source)?;

        let definition = self.definitions.store(DiagramParser::parse(source, id, name)?);
        let workflow_id = definition.id.clone();
        tracing::info!(
            "Imported workflow '{}' ({}) with {} nodes",
            definition.name,
            workflow_id,
            definition.nodes.len()
        );

        self.instances.clear(&workflow_id);
        self.start_instance(workflow_id.as_str(), cancel).await?;

        if let Some(persistence) = &self.persistence {
            let snapshot = DefinitionSnapshot::new(definition.as_ref().clone(), source);
            if let Err(e) = persistence.create_definition(&snapshot).await {
                tracing::warn!("Failed to persist definition {}: {}", workflow_id, e);
            }
        }

        Ok(workflow_id)
    }

    /// Place the instance on its start node.
    ///
    /// A position recorded by persistence is restored as-is when it still
    /// names a node of the definition. Otherwise the calculated start node is
    /// entered. Either way the actions of the declared start node and of the
    /// calculated start node are then attempted.
    pub async fn start_instance(
        &self,
        workflow_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<NodeId>> {
        let (id, definition) = self.lookup(workflow_id)?;

        if let Some(node_id) = self.persisted_position(&id, &definition).await {
            tracing::info!("Restored workflow {} at node {}", id, node_id);
            self.instances.set_current_node(&id, node_id.clone());
            self.run_start_actions(&id, &definition, cancel).await;
            return Ok(Some(node_id));
        }

        Ok(self.start_fresh(&id, &definition, cancel).await)
    }

    /// Discard variables and position, then start from the calculated start
    /// node regardless of any persisted position
    pub async fn restart_instance(
        &self,
        workflow_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<NodeId>> {
        let (id, definition) = self.lookup(workflow_id)?;
        self.instances.clear(&id);
        tracing::info!("Restarting workflow {}", id);
        Ok(self.start_fresh(&id, &definition, cancel).await)
    }

    async fn start_fresh(
        &self,
        id: &WorkflowId,
        definition: &Arc<WorkflowDefinition>,
        cancel: &CancellationToken,
    ) -> Option<NodeId> {
        let Some(effective) = StateCalculator::calculate_start_node(definition) else {
            tracing::warn!("Workflow {} has no nodes to start from", id);
            return None;
        };

        self.instances.set_current_node(id, effective.clone());
        self.persist_position(id, &effective).await;
        tracing::info!("Started workflow {} at node {}", id, effective);

        self.run_start_actions(id, definition, cancel).await;
        Some(effective)
    }

    /// Best-effort actions of the declared start node (when it differs from
    /// the calculated one and has an action) and of the calculated start node
    async fn run_start_actions(
        &self,
        id: &WorkflowId,
        definition: &Arc<WorkflowDefinition>,
        cancel: &CancellationToken,
    ) {
        let Some(effective) = StateCalculator::calculate_start_node(definition) else {
            return;
        };

        if let Some(declared) = definition.start_node_id() {
            if declared != &effective {
                if let Some(node) = definition.node(declared).filter(|node| node.has_action()) {
                    self.executor.execute(id, node, definition, cancel).await;
                }
            }
        }
        if let Some(node) = definition.node(&effective) {
            self.executor.execute(id, node, definition, cancel).await;
        }
    }

    /// Follow the outgoing transition selected by `value`.
    ///
    /// Returns `Ok(false)` without changing state when nothing matches. After
    /// a move the new node's action runs; while that succeeds and the node
    /// has exactly one outgoing transition the instance keeps advancing, up
    /// to the configured auto-advance bound.
    pub async fn advance_by_choice_value(
        &self,
        workflow_id: &str,
        value: Option<ChoiceValue>,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let (id, definition) = self.lookup(workflow_id)?;

        let Some(current) = self.instances.current_node(&id) else {
            tracing::debug!("Workflow {} has not been started", id);
            return Ok(false);
        };

        let outgoing: Vec<&Transition> = definition.outgoing(&current).collect();
        let Some(target) = resolve_choice(&definition, &outgoing, value.as_ref()) else {
            tracing::debug!(
                "No transition from {} in workflow {} matches {:?}",
                current,
                id,
                value
            );
            return Ok(false);
        };

        tracing::info!("Workflow {} advancing {} -> {}", id, current, target);
        self.enter(&id, &definition, target, cancel).await;
        Ok(true)
    }

    async fn enter(
        &self,
        id: &WorkflowId,
        definition: &Arc<WorkflowDefinition>,
        mut target: NodeId,
        cancel: &CancellationToken,
    ) {
        let mut hops = 0;
        loop {
            self.instances.set_current_node(id, target.clone());
            self.persist_position(id, &target).await;

            let Some(node) = definition.node(&target) else {
                return;
            };
            if !self.executor.execute(id, node, definition, cancel).await.succeeded() {
                return;
            }

            let next = match definition.outgoing(&target).collect::<Vec<_>>().as_slice() {
                [only] => only.to_node_id.clone(),
                _ => return,
            };
            if hops >= self.config.max_auto_advance {
                tracing::warn!(
                    "Workflow {} stopped auto-advancing at {} after {} hops",
                    id,
                    target,
                    hops
                );
                return;
            }

            hops += 1;
            tracing::debug!("Workflow {} auto-advancing {} -> {}", id, target, next);
            target = next;
        }
    }

    /// Prompt or choice set for the instance's current node
    pub fn get_current_state_payload(&self, workflow_id: &str) -> Result<WorkflowStatePayload> {
        let (id, definition) = self.lookup(workflow_id)?;
        Ok(match self.instances.current_node(&id) {
            Some(current) => StateCalculator::calculate_current_payload(&definition, &current),
            None => WorkflowStatePayload::text(None),
        })
    }

    /// Node the instance currently sits on
    pub fn current_node_id(&self, workflow_id: &str) -> Result<Option<NodeId>> {
        let (id, _) = self.lookup(workflow_id)?;
        Ok(self.instances.current_node(&id))
    }

    /// Snapshot of the instance variables, sorted by name
    pub fn variables(&self, workflow_id: &str) -> Result<BTreeMap<String, String>> {
        let (id, _) = self.lookup(workflow_id)?;
        Ok(self.instances.variables(&id).to_map())
    }

    /// Read one instance variable, ignoring case
    pub fn get_variable(&self, workflow_id: &str, name: &str) -> Result<Option<String>> {
        let (id, _) = self.lookup(workflow_id)?;
        let name = require_non_blank("name", name)?;
        Ok(self.instances.get_variable(&id, name))
    }

    /// Write one instance variable
    pub fn set_variable(&self, workflow_id: &str, name: &str, value: &str) -> Result<()> {
        let (id, _) = self.lookup(workflow_id)?;
        let name = require_non_blank("name", name)?;
        self.instances.set_variable(&id, name, value);
        Ok(())
    }

    /// Stored definition for `workflow_id`
    pub fn definition(&self, workflow_id: &str) -> Result<Arc<WorkflowDefinition>> {
        self.lookup(workflow_id).map(|(_, definition)| definition)
    }

    /// Ids of all imported workflows, sorted
    pub fn list_workflows(&self) -> Vec<WorkflowId> {
        self.definitions.ids()
    }

    fn lookup(&self, workflow_id: &str) -> Result<(WorkflowId, Arc<WorkflowDefinition>)> {
        let id = WorkflowId::from(require_non_blank("workflow_id", workflow_id)?);
        let definition = self.definitions.get(&id)?;
        Ok((id, definition))
    }

    async fn persisted_position(
        &self,
        id: &WorkflowId,
        definition: &WorkflowDefinition,
    ) -> Option<NodeId> {
        let persistence = self.persistence.as_ref()?;
        match persistence.get_current_node_id(id).await {
            Ok(Some(node_id)) if definition.node(&node_id).is_some() => Some(node_id),
            Ok(Some(node_id)) => {
                tracing::warn!(
                    "Ignoring persisted node {} not present in workflow {}",
                    node_id,
                    id
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to load persisted position of {}: {}", id, e);
                None
            }
        }
    }

    async fn persist_position(&self, id: &WorkflowId, node_id: &NodeId) {
        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.update_current_node_id(id, node_id).await {
                tracing::warn!("Failed to persist position of {}: {}", id, e);
            }
        }
    }
}

impl std::fmt::Debug for WorkflowController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowController")
            .field("workflows", &self.definitions.len())
            .field("persistence", &self.persistence.is_some())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::test_helpers::*;
    use crate::workflow::MemoryPersistence;
    use crate::ChatflowError;

    const BRANCHING: &str = r#"
start
:Welcome;
if (ready?) then (yes)
  :Begin;
else (no)
  :Later;
endif
stop
"#;

    fn controller() -> WorkflowController {
        WorkflowController::with_config(
            Arc::new(ActionHandlerRegistry::with_builtins()),
            EngineConfig::default(),
        )
    }

    async fn import(controller: &WorkflowController, source: &str) -> WorkflowId {
        controller
            .import_workflow(source, Some("flow"), None, &CancellationToken::new())
            .await
            .unwrap()
    }

    #[test]
    fn test_resolve_choice_order() {
        let mut definition = create_branching_definition();
        // A label that looks like another target's id
        definition.nodes[1].label = "node_4".to_string();
        let node_1 = NodeId::new("node_1");
        let outgoing: Vec<&Transition> = definition.outgoing(&node_1).collect();
        let resolve = |value: Option<ChoiceValue>| {
            resolve_choice(&definition, &outgoing, value.as_ref()).map(|n| n.to_string())
        };

        assert_eq!(resolve(Some("node_4".into())).as_deref(), Some("node_4"));
        assert_eq!(resolve(Some("Green".into())).as_deref(), Some("node_3"));
        assert_eq!(resolve(Some(ChoiceValue::Index(1))).as_deref(), Some("node_3"));
        assert_eq!(resolve(Some(" 2 ".into())).as_deref(), Some("node_4"));
        assert_eq!(resolve(Some(ChoiceValue::Index(3))), None);
        assert_eq!(resolve(Some(ChoiceValue::Index(-1))), None);
        assert_eq!(resolve(Some("purple".into())), None);
        assert_eq!(resolve(None), None);
    }

    #[test]
    fn test_resolve_choice_single_path() {
        let definition = create_linear_definition();
        let node_1 = NodeId::new("node_1");
        let outgoing: Vec<&Transition> = definition.outgoing(&node_1).collect();

        assert_eq!(
            resolve_choice(&definition, &outgoing, None),
            Some(NodeId::new("node_2"))
        );
        assert_eq!(
            resolve_choice(&definition, &outgoing, Some(&ChoiceValue::Text("  ".into()))),
            Some(NodeId::new("node_2"))
        );
    }

    #[test]
    fn test_choice_value_deserializes_untagged() {
        let index: ChoiceValue = serde_json::from_str("2").unwrap();
        let text: ChoiceValue = serde_json::from_str(r#""yes""#).unwrap();
        assert_eq!(index, ChoiceValue::Index(2));
        assert_eq!(text, ChoiceValue::Text("yes".to_string()));
    }

    #[tokio::test]
    async fn test_import_starts_on_first_real_node() {
        let controller = controller();
        let id = import(&controller, BRANCHING).await;

        assert_eq!(id.as_str(), "flow");
        assert_eq!(
            controller.current_node_id("flow").unwrap(),
            Some(NodeId::new("node_2"))
        );
        let payload = controller.get_current_state_payload("flow").unwrap();
        assert!(payload.is_choice);
        let labels: Vec<_> = payload.choices.iter().map(|c| c.display_text.as_str()).collect();
        assert_eq!(labels, vec!["Begin", "Later"]);
        assert_eq!(controller.list_workflows(), vec![id]);
    }

    #[tokio::test]
    async fn test_advance_by_label_and_auto_advance_stops_without_action() {
        let controller = controller();
        import(&controller, BRANCHING).await;
        let cancel = CancellationToken::new();

        assert!(controller
            .advance_by_choice_value("flow", Some("Later".into()), &cancel)
            .await
            .unwrap());
        // No action on "Later", so the instance waits there
        let current = controller.current_node_id("flow").unwrap().unwrap();
        assert_eq!(controller.definition("flow").unwrap().node(&current).unwrap().label, "Later");

        assert!(controller.advance_by_choice_value("flow", None, &cancel).await.unwrap());
        assert!(controller.current_node_id("flow").unwrap().unwrap().as_str().starts_with("join_"));
    }

    #[tokio::test]
    async fn test_no_match_leaves_state_unchanged() {
        let controller = controller();
        import(&controller, BRANCHING).await;
        let cancel = CancellationToken::new();

        let before = controller.current_node_id("flow").unwrap();
        assert!(!controller
            .advance_by_choice_value("flow", Some(ChoiceValue::Index(5)), &cancel)
            .await
            .unwrap());
        assert!(!controller.advance_by_choice_value("flow", None, &cancel).await.unwrap());
        assert_eq!(controller.current_node_id("flow").unwrap(), before);
    }

    #[tokio::test]
    async fn test_action_chain_auto_advances() {
        let source = r#"
start
:Ask;
if (go?) then (yes)
  :Save;
  note right: {"action": "set_variable", "params": {"saved": "{{answer}}"}}
  :Log;
  note right: {"action": "log", "params": {"message": "saved {{saved}}"}}
  :Done;
endif
"#;
        let controller = controller();
        import(&controller, source).await;
        controller.set_variable("flow", "Answer", "42").unwrap();

        let cancel = CancellationToken::new();
        assert!(controller
            .advance_by_choice_value("flow", Some("yes".into()), &cancel)
            .await
            .is_ok());
        // "yes" is a condition, not a label or id, so nothing matched
        assert_eq!(controller.get_variable("flow", "saved").unwrap(), None);

        assert!(controller
            .advance_by_choice_value("flow", Some("Save".into()), &cancel)
            .await
            .unwrap());
        assert_eq!(controller.get_variable("flow", "SAVED").unwrap().as_deref(), Some("42"));
        let current = controller.current_node_id("flow").unwrap().unwrap();
        assert_eq!(controller.definition("flow").unwrap().node(&current).unwrap().label, "Done");
    }

    #[tokio::test]
    async fn test_auto_advance_is_bounded() {
        let source = r#"
:Hub;
:Hub --> :Tick;
:Hub --> :Exit;
:Tick --> :Tock;
:Tock --> :Tick;
note right of Tick: {"action": "set_variable", "params": {"ticked": "yes"}}
note right of Tock: {"action": "set_variable", "params": {"tocked": "yes"}}
"#;
        let controller = WorkflowController::with_config(
            Arc::new(ActionHandlerRegistry::with_builtins()),
            EngineConfig::default().with_max_auto_advance(3),
        );
        import(&controller, source).await;
        let definition = controller.definition("flow").unwrap();
        let label = |id: Option<NodeId>| definition.node(&id.unwrap()).unwrap().label.clone();
        assert_eq!(label(controller.current_node_id("flow").unwrap()), "Hub");

        assert!(controller
            .advance_by_choice_value("flow", Some("Tick".into()), &CancellationToken::new())
            .await
            .unwrap());
        // Tick, Tock, Tick, Tock: three auto-advances after the choice
        assert_eq!(label(controller.current_node_id("flow").unwrap()), "Tock");
        assert_eq!(controller.get_variable("flow", "ticked").unwrap().as_deref(), Some("yes"));
    }

    #[tokio::test]
    async fn test_start_actions_run_on_declared_and_effective_nodes() {
        let source = r#"
start
note right: {"action": "set_variable", "params": {"from_start": "1"}}
:Greet;
note right: {"action": "set_variable", "params": {"from_greet": "1"}}
:Next;
"#;
        let controller = controller();
        import(&controller, source).await;

        let variables = controller.variables("flow").unwrap();
        assert_eq!(variables.get("from_start").map(String::as_str), Some("1"));
        assert_eq!(variables.get("from_greet").map(String::as_str), Some("1"));
        // Start actions never auto-advance
        let current = controller.current_node_id("flow").unwrap().unwrap();
        assert_eq!(controller.definition("flow").unwrap().node(&current).unwrap().label, "Greet");
    }

    #[tokio::test]
    async fn test_start_node_action_runs_once_when_not_advanced() {
        let registry = Arc::new(ActionHandlerRegistry::new());
        let recorder = RecordingHandler::shared();
        registry.register_shared("record", recorder.clone());
        let controller = WorkflowController::with_config(registry, EngineConfig::default());

        let source = ":Only;\nnote right: {\"action\": \"record\"}";
        import(&controller, source).await;
        assert_eq!(recorder.call_count(), 1);
    }

    #[tokio::test]
    async fn test_persisted_position_is_restored() {
        let persistence = Arc::new(MemoryPersistence::new());
        let controller = controller().with_persistence(persistence.clone());
        import(&controller, BRANCHING).await;
        let cancel = CancellationToken::new();
        controller
            .advance_by_choice_value("flow", Some("Begin".into()), &cancel)
            .await
            .unwrap();
        let position = controller.current_node_id("flow").unwrap();
        assert!(persistence.definition(&WorkflowId::new("flow")).is_some());

        let reloaded = WorkflowController::with_config(
            Arc::new(ActionHandlerRegistry::with_builtins()),
            EngineConfig::default(),
        )
        .with_persistence(persistence.clone());
        import(&reloaded, BRANCHING).await;
        assert_eq!(reloaded.current_node_id("flow").unwrap(), position);

        let restarted = reloaded.restart_instance("flow", &cancel).await.unwrap();
        assert_eq!(restarted, Some(NodeId::new("node_2")));
        assert_eq!(
            persistence
                .get_current_node_id(&WorkflowId::new("flow"))
                .await
                .unwrap(),
            Some(NodeId::new("node_2"))
        );
    }

    #[tokio::test]
    async fn test_restored_position_still_runs_start_actions() {
        let source = r#"
start
:Greet;
note right: {"action": "set_variable", "params": {"greeted": "1"}}
if (again?) then (yes)
  :Wave;
else (no)
  :Leave;
endif
"#;
        let persistence = Arc::new(MemoryPersistence::new());
        let controller = controller().with_persistence(persistence.clone());
        import(&controller, source).await;
        controller
            .advance_by_choice_value("flow", Some("Wave".into()), &CancellationToken::new())
            .await
            .unwrap();
        let position = controller.current_node_id("flow").unwrap();

        let reloaded = self::controller().with_persistence(persistence);
        import(&reloaded, source).await;

        assert_eq!(reloaded.current_node_id("flow").unwrap(), position);
        assert_eq!(
            reloaded.get_variable("flow", "greeted").unwrap().as_deref(),
            Some("1")
        );
    }

    #[tokio::test]
    async fn test_restart_clears_variables() {
        let controller = controller();
        import(&controller, BRANCHING).await;
        controller.set_variable("flow", "x", "1").unwrap();

        controller
            .restart_instance("flow", &CancellationToken::new())
            .await
            .unwrap();
        assert!(controller.variables("flow").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_argument_and_not_found_errors() {
        let controller = controller();
        let cancel = CancellationToken::new();

        assert!(matches!(
            controller.import_workflow("  ", None, None, &cancel).await,
            Err(ChatflowError::InvalidArgument { .. })
        ));
        assert!(matches!(
            controller.get_current_state_payload(""),
            Err(ChatflowError::InvalidArgument { .. })
        ));
        assert!(controller
            .advance_by_choice_value("ghost", None, &cancel)
            .await
            .unwrap_err()
            .is_not_found());
        assert!(controller.set_variable("ghost", "a", "b").unwrap_err().is_not_found());

        import(&controller, BRANCHING).await;
        assert!(matches!(
            controller.set_variable("flow", " ", "b"),
            Err(ChatflowError::InvalidArgument { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_graph_has_no_current_node() {
        let controller = controller();
        import(&controller, "no statements here").await;

        assert_eq!(controller.current_node_id("flow").unwrap(), None);
        assert_eq!(
            controller.get_current_state_payload("flow").unwrap(),
            WorkflowStatePayload::text(None)
        );
        assert!(!controller
            .advance_by_choice_value("flow", None, &CancellationToken::new())
            .await
            .unwrap());
    }
}
