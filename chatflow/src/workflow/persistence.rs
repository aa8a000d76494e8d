//! Durable-position collaborator used by the controller
//!
//! The engine treats persistence as best-effort: every failure is logged by
//! the caller and the in-memory state stays authoritative for the session.

use crate::workflow::{NodeId, WorkflowDefinition, WorkflowId};
use crate::{ChatflowError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Definition as handed to persistence at import time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionSnapshot {
    /// Parsed graph
    pub definition: WorkflowDefinition,
    /// Diagram text the graph was parsed from
    pub source_text: String,
    /// Import time
    pub created_at: DateTime<Utc>,
}

impl DefinitionSnapshot {
    /// Snapshot taken now
    pub fn new(definition: WorkflowDefinition, source_text: impl Into<String>) -> Self {
        Self {
            definition,
            source_text: source_text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Storage for definitions and instance positions that outlives the process
#[async_trait]
pub trait WorkflowPersistence: Send + Sync {
    /// Last recorded node of an instance, if any
    async fn get_current_node_id(&self, workflow_id: &WorkflowId) -> Result<Option<NodeId>>;

    /// Record a newly imported definition
    async fn create_definition(&self, snapshot: &DefinitionSnapshot) -> Result<()>;

    /// Record the node an instance moved to
    async fn update_current_node_id(&self, workflow_id: &WorkflowId, node_id: &NodeId)
        -> Result<()>;
}

/// In-memory persistence, mainly for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    definitions: DashMap<WorkflowId, DefinitionSnapshot>,
    positions: DashMap<WorkflowId, NodeId>,
}

impl MemoryPersistence {
    /// Create empty persistence
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored snapshot for `workflow_id`
    pub fn definition(&self, workflow_id: &WorkflowId) -> Option<DefinitionSnapshot> {
        self.definitions.get(workflow_id).map(|s| s.clone())
    }
}

#[async_trait]
impl WorkflowPersistence for MemoryPersistence {
    async fn get_current_node_id(&self, workflow_id: &WorkflowId) -> Result<Option<NodeId>> {
        Ok(self.positions.get(workflow_id).map(|node| node.clone()))
    }

    async fn create_definition(&self, snapshot: &DefinitionSnapshot) -> Result<()> {
        self.definitions
            .insert(snapshot.definition.id.clone(), snapshot.clone());
        Ok(())
    }

    async fn update_current_node_id(
        &self,
        workflow_id: &WorkflowId,
        node_id: &NodeId,
    ) -> Result<()> {
        self.positions.insert(workflow_id.clone(), node_id.clone());
        Ok(())
    }
}

/// Position record written per instance
#[derive(Debug, Clone, Serialize, Deserialize)]
struct InstanceRecord {
    workflow_id: WorkflowId,
    current_node_id: NodeId,
    updated_at: DateTime<Utc>,
}

/// JSON files under a root directory:
/// `definitions/<id>.json` and `instances/<id>.json`
#[derive(Debug, Clone)]
pub struct FileSystemPersistence {
    root: PathBuf,
}

impl FileSystemPersistence {
    /// Persist under `root`; directories are created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn definition_path(&self, workflow_id: &WorkflowId) -> PathBuf {
        self.root
            .join("definitions")
            .join(file_name(workflow_id))
    }

    fn instance_path(&self, workflow_id: &WorkflowId) -> PathBuf {
        self.root.join("instances").join(file_name(workflow_id))
    }

    /// Read back a stored definition snapshot
    pub async fn load_definition(
        &self,
        workflow_id: &WorkflowId,
    ) -> Result<Option<DefinitionSnapshot>> {
        read_json(&self.definition_path(workflow_id)).await
    }

    async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("create", parent, e))?;
        }
        let content =
            serde_json::to_string_pretty(value).map_err(|e| storage_error("encode", path, e))?;
        // Write then rename so readers never see a partial file
        let temp = path.with_extension("json.tmp");
        tokio::fs::write(&temp, content)
            .await
            .map_err(|e| storage_error("write", &temp, e))?;
        tokio::fs::rename(&temp, path)
            .await
            .map_err(|e| storage_error("replace", path, e))?;
        Ok(())
    }
}

fn storage_error(action: &str, path: &Path, error: impl Display) -> ChatflowError {
    ChatflowError::Persistence(format!(
        "Failed to {} '{}': {}",
        action,
        path.display(),
        error
    ))
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| storage_error("decode", path, e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(storage_error("read", path, e)),
    }
}

/// File name for an id. Bytes outside `[A-Za-z0-9._-]` are written as `%XX`,
/// so distinct ids never share a file.
fn file_name(workflow_id: &WorkflowId) -> String {
    let mut name = String::with_capacity(workflow_id.as_str().len() + 5);
    for byte in workflow_id.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.') {
            name.push(char::from(byte));
        } else {
            name.push_str(&format!("%{:02X}", byte));
        }
    }
    // "." and ".." must not name the directory itself
    if name.bytes().all(|b| b == b'.') {
        name = name.replace('.', "%2E");
    }
    name.push_str(".json");
    name
}

#[async_trait]
impl WorkflowPersistence for FileSystemPersistence {
    async fn get_current_node_id(&self, workflow_id: &WorkflowId) -> Result<Option<NodeId>> {
        let record: Option<InstanceRecord> = read_json(&self.instance_path(workflow_id)).await?;
        Ok(record.map(|record| record.current_node_id))
    }

    async fn create_definition(&self, snapshot: &DefinitionSnapshot) -> Result<()> {
        Self::write_json(&self.definition_path(&snapshot.definition.id), snapshot).await
    }

    async fn update_current_node_id(
        &self,
        workflow_id: &WorkflowId,
        node_id: &NodeId,
    ) -> Result<()> {
        let record = InstanceRecord {
            workflow_id: workflow_id.clone(),
            current_node_id: node_id.clone(),
            updated_at: Utc::now(),
        };
        Self::write_json(&self.instance_path(workflow_id), &record).await
    }
}
