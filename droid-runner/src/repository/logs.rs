//! Logs repository
//!
//! Saves the captured output of a task next to the run's other artifacts.

use anyhow::{Context, Result};
use async_trait::async_trait;
use droid_core::domain::TaskResult;
use std::path::PathBuf;

/// Repository trait for task output storage
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Saves the output of a committed task
    ///
    /// # Returns
    /// The location of the saved log, relative to the artifact root
    async fn save(&self, result: &TaskResult, output: &[u8]) -> Result<String>;
}

/// File implementation of LogStore writing under the artifacts mount
pub struct ArtifactLogStore {
    root: PathBuf,
}

impl ArtifactLogStore {
    /// Creates a log store rooted at the artifacts mount
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl LogStore for ArtifactLogStore {
    async fn save(&self, result: &TaskResult, output: &[u8]) -> Result<String> {
        let relative = result
            .log_path()
            .context("Task result has no store identifier, cannot save its log")?;
        let path = self.root.join(&relative);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }

        tokio::fs::write(&path, output)
            .await
            .with_context(|| format!("Failed to write task log {}", path.display()))?;

        Ok(relative)
    }
}
