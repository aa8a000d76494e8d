//! Configuration management for chatflow
//!
//! Settings are resolved from defaults, then overridden by `CHATFLOW_*`
//! environment variables.

use crate::common::env_loader::EnvLoader;
use std::path::PathBuf;
use std::time::Duration;

const ENV_PREFIX: &str = "CHATFLOW";
const DEFAULT_ACTION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_AUTO_ADVANCE: usize = 16;

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Upper bound on a single action handler invocation (default: 30s)
    pub action_timeout: Duration,
    /// Maximum chained auto-advances after one choice (default: 16)
    pub max_auto_advance: usize,
    /// Directory for file-system persistence, if any
    pub state_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            action_timeout: Duration::from_secs(DEFAULT_ACTION_TIMEOUT_SECS),
            max_auto_advance: DEFAULT_MAX_AUTO_ADVANCE,
            state_dir: None,
        }
    }
}

impl EngineConfig {
    /// Build a configuration from defaults overridden by environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_vars();
        config
    }

    fn apply_env_vars(&mut self) {
        let loader = EnvLoader::new(ENV_PREFIX);

        self.action_timeout = loader.duration_secs("ACTION_TIMEOUT_SECS", self.action_timeout);
        self.max_auto_advance =
            loader.validated("MAX_AUTO_ADVANCE", self.max_auto_advance, |n| *n > 0);
        self.state_dir = loader.path("STATE_DIR");
    }

    /// Get the global configuration instance
    pub fn global() -> &'static Self {
        static CONFIG: std::sync::OnceLock<EngineConfig> = std::sync::OnceLock::new();
        CONFIG.get_or_init(EngineConfig::from_env)
    }

    /// Override the action timeout
    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    /// Override the auto-advance bound
    pub fn with_max_auto_advance(mut self, max_auto_advance: usize) -> Self {
        self.max_auto_advance = max_auto_advance.max(1);
        self
    }
}
