//! State management for planned stacks
//!
//! Records the last saved stack graph of each environment in
//! `.stackflow/state/{environment}.json` so that the next plan can be
//! diffed against it.

use crate::error::{CloudError, Result};
use crate::graph::StackGraph;
use crate::stack::StackSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".stackflow";
const STATE_SUBDIR: &str = "state";

/// Snapshot of the stacks saved for one environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployedState {
    /// State file version
    pub version: u32,

    pub environment: String,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    /// Stacks indexed by id
    pub stacks: BTreeMap<String, StackSpec>,
}

impl DeployedState {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            version: STATE_VERSION,
            environment: environment.into(),
            updated_at: Utc::now(),
            stacks: BTreeMap::new(),
        }
    }

    /// Capture every stack of `graph`
    pub fn from_graph(environment: impl Into<String>, graph: &StackGraph) -> Self {
        let mut state = Self::new(environment);
        state.stacks = graph
            .iter()
            .map(|stack| (stack.id.clone(), stack.clone()))
            .collect();
        state
    }

    /// Rebuild the recorded stack graph
    pub fn graph(&self) -> Result<StackGraph> {
        StackGraph::from_stacks(self.stacks.values().cloned())
    }
}

/// State manager for reading/writing state files
pub struct StateManager {
    /// Project root directory
    project_root: PathBuf,
}

impl StateManager {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    /// Get the state directory path
    pub fn state_dir(&self) -> PathBuf {
        self.project_root.join(STATE_DIR).join(STATE_SUBDIR)
    }

    /// Get the state file path of an environment
    pub fn state_path(&self, environment: &str) -> PathBuf {
        self.state_dir().join(format!("{}.json", environment))
    }

    fn backup_path(&self, environment: &str) -> PathBuf {
        self.state_dir().join(format!("{}.json.backup", environment))
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load the recorded state of an environment
    ///
    /// Returns `None` when nothing has been saved yet.
    pub async fn load(&self, environment: &str) -> Result<Option<DeployedState>> {
        let path = self.state_path(environment);
        if !path.exists() {
            tracing::debug!(environment, "State file not found");
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        let state: DeployedState = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(CloudError::StateError(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }
        if state.environment != environment {
            return Err(CloudError::StateError(format!(
                "State file {} belongs to environment '{}'",
                path.display(),
                state.environment
            )));
        }

        tracing::debug!("Loaded state with {} stacks", state.stacks.len());
        Ok(Some(state))
    }

    /// Save the state, keeping the previous file as a backup
    pub async fn save(&self, state: &DeployedState) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.state_path(&state.environment);
        let backup = self.backup_path(&state.environment);

        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
            tracing::debug!("Created state backup");
        }

        let content = serde_json::to_string_pretty(state)?;
        fs::write(&path, content).await?;

        tracing::debug!("Saved state with {} stacks", state.stacks.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::StackKind;
    use tempfile::tempdir;

    fn graph() -> StackGraph {
        let mut graph = StackGraph::new();
        graph
            .add(StackSpec::new("BaseStack", StackKind::BaseStack))
            .unwrap();
        graph
            .add(StackSpec::new("QueueService-Orders", StackKind::QueueService))
            .unwrap();
        graph
            .add_dependency("QueueService-Orders", "BaseStack")
            .unwrap();
        graph
    }

    #[tokio::test]
    async fn test_state_save_load() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let state = DeployedState::from_graph("prod", &graph());
        manager.save(&state).await.unwrap();

        assert!(temp_dir.path().join(".stackflow/state/prod.json").exists());
        let loaded = manager.load("prod").await.unwrap().unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.graph().unwrap(), graph());
    }

    #[tokio::test]
    async fn test_missing_state() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        assert!(manager.load("test").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_creates_backup() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        manager.save(&DeployedState::new("test")).await.unwrap();
        manager
            .save(&DeployedState::from_graph("test", &graph()))
            .await
            .unwrap();

        let backup = temp_dir.path().join(".stackflow/state/test.json.backup");
        let content = std::fs::read_to_string(backup).unwrap();
        let previous: DeployedState = serde_json::from_str(&content).unwrap();
        assert!(previous.stacks.is_empty());

        let current = manager.load("test").await.unwrap().unwrap();
        assert_eq!(current.stacks.len(), 2);
    }

    #[tokio::test]
    async fn test_newer_version_rejected() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let mut state = DeployedState::new("test");
        state.version = STATE_VERSION + 1;
        manager.save(&state).await.unwrap();

        assert!(matches!(
            manager.load("test").await,
            Err(CloudError::StateError(_))
        ));
    }

    #[tokio::test]
    async fn test_environment_mismatch_rejected() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        manager.save(&DeployedState::new("prod")).await.unwrap();
        std::fs::rename(manager.state_path("prod"), manager.state_path("test")).unwrap();

        assert!(matches!(
            manager.load("test").await,
            Err(CloudError::StateError(_))
        ));
    }
}
