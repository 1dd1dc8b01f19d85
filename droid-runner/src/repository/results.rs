//! Results repository
//!
//! Persists task results to the result store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use droid_client::StoreClient;
use droid_core::domain::TaskResult;

/// Repository trait for task result persistence
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persists a new result
    ///
    /// # Returns
    /// The stored result with its store-assigned identifier
    async fn create(&self, result: &TaskResult) -> Result<TaskResult>;

    /// Persists changes to a result that already has an identifier
    async fn update(&self, result: &TaskResult) -> Result<TaskResult>;
}

#[async_trait]
impl ResultStore for StoreClient {
    async fn create(&self, result: &TaskResult) -> Result<TaskResult> {
        self.create_task(result)
            .await
            .context("Failed to commit a new task")
    }

    async fn update(&self, result: &TaskResult) -> Result<TaskResult> {
        self.update_task(result)
            .await
            .with_context(|| format!("Failed to commit changes to task {:?}", result.id))
    }
}
