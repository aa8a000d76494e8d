//! Name-keyed registry of action handlers

use super::{ActionContext, ActionHandler, LogHandler, SetVariableHandler, WaitHandler};
use dashmap::DashMap;
use std::sync::Arc;

/// Builds a handler for one call from its context
pub type HandlerFactory = Arc<dyn Fn(&ActionContext) -> Arc<dyn ActionHandler> + Send + Sync>;

#[derive(Clone)]
enum HandlerEntry {
    Singleton(Arc<dyn ActionHandler>),
    Factory(HandlerFactory),
}

/// Registry resolving action names to handlers.
///
/// Names are case-sensitive. Registering a name again replaces the previous
/// entry, whether it was a singleton or a factory.
#[derive(Default)]
pub struct ActionHandlerRegistry {
    handlers: DashMap<String, HandlerEntry>,
}

impl ActionHandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding `set_variable`, `log` and `wait`
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(SetVariableHandler);
        registry.register(LogHandler);
        registry.register(WaitHandler);
        registry
    }

    /// Register a shared handler under its own name
    pub fn register<H: ActionHandler + 'static>(&self, handler: H) {
        let handler: Arc<dyn ActionHandler> = Arc::new(handler);
        self.register_shared(handler.name().to_string(), handler);
    }

    /// Register an already shared handler under `name`
    pub fn register_shared(&self, name: impl Into<String>, handler: Arc<dyn ActionHandler>) {
        self.insert(name.into(), HandlerEntry::Singleton(handler));
    }

    /// Register a factory that builds a fresh handler for every call
    pub fn register_factory<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ActionContext) -> Arc<dyn ActionHandler> + Send + Sync + 'static,
    {
        self.insert(name.into(), HandlerEntry::Factory(Arc::new(factory)));
    }

    fn insert(&self, name: String, entry: HandlerEntry) {
        if self.handlers.insert(name.clone(), entry).is_some() {
            tracing::debug!("Replaced action handler '{}'", name);
        }
    }

    /// Resolve the handler for `name`, invoking its factory if it has one
    pub fn resolve(&self, name: &str, context: &ActionContext) -> Option<Arc<dyn ActionHandler>> {
        // Clone the entry so the factory runs without holding the shard lock
        let entry = self.handlers.get(name).map(|entry| entry.value().clone())?;
        Some(match entry {
            HandlerEntry::Singleton(handler) => handler,
            HandlerEntry::Factory(factory) => factory(context),
        })
    }

    /// Whether a handler is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Remove a registration
    pub fn unregister(&self, name: &str) -> bool {
        self.handlers.remove(name).is_some()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.handlers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for ActionHandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionHandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::test_helpers::*;
    use crate::workflow::{InstanceStore, NodeId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn context() -> ActionContext {
        let definition = Arc::new(create_linear_definition());
        let node = definition.node(&NodeId::new("node_1")).unwrap().clone();
        ActionContext::new(
            definition.id.clone(),
            node,
            definition,
            Arc::new(InstanceStore::new()),
        )
    }

    #[test]
    fn test_builtins_registered() {
        let registry = ActionHandlerRegistry::with_builtins();
        assert_eq!(registry.names(), vec!["log", "set_variable", "wait"]);
    }

    #[test]
    fn test_singleton_resolves_same_instance() {
        let registry = ActionHandlerRegistry::new();
        let handler = RecordingHandler::shared();
        registry.register_shared("record", handler.clone());

        let first = registry.resolve("record", &context()).unwrap();
        let second = registry.resolve("record", &context()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "record");
    }

    #[test]
    fn test_factory_runs_per_resolve() {
        let registry = ActionHandlerRegistry::new();
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        registry.register_factory("record", move |_context| {
            counter.fetch_add(1, Ordering::SeqCst);
            RecordingHandler::shared() as Arc<dyn ActionHandler>
        });

        registry.resolve("record", &context()).unwrap();
        registry.resolve("record", &context()).unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = ActionHandlerRegistry::with_builtins();
        assert!(registry.resolve("log", &context()).is_some());
        assert!(registry.resolve("Log", &context()).is_none());
        assert!(registry.resolve("missing", &context()).is_none());
    }

    #[test]
    fn test_reregistration_replaces() {
        let registry = ActionHandlerRegistry::with_builtins();
        let replacement = RecordingHandler::shared();
        registry.register_shared("log", replacement.clone());

        let resolved = registry.resolve("log", &context()).unwrap();
        assert_eq!(resolved.name(), "record");
        assert_eq!(registry.len(), 3);

        assert!(registry.unregister("log"));
        assert!(!registry.contains("log"));
    }
}
