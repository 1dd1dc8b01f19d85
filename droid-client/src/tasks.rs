//! Task result endpoints of the store API

use crate::StoreClient;
use crate::error::{ClientError, Result};
use droid_core::domain::TaskResult;

impl StoreClient {
    /// Persist a new task result
    ///
    /// # Returns
    /// The stored result, carrying its store-assigned identifier
    pub async fn create_task(&self, task: &TaskResult) -> Result<TaskResult> {
        let url = format!("{}/run/{}/tasks", self.base_url, task.run_id);
        let response = self
            .authorized(self.client.post(&url))
            .json(task)
            .send()
            .await?;

        let created: TaskResult = self.handle_response(response).await?;
        if created.id.is_none() {
            return Err(ClientError::ParseError(
                "store did not assign a task identifier".to_string(),
            ));
        }

        tracing::debug!("Created task {:?} for run {}", created.id, created.run_id);
        Ok(created)
    }

    /// Persist changes to an existing task result
    ///
    /// # Returns
    /// The stored result after the update
    pub async fn update_task(&self, task: &TaskResult) -> Result<TaskResult> {
        let id = task.id.ok_or_else(|| {
            ClientError::InvalidRequest("task result has no store identifier".to_string())
        })?;

        let url = format!("{}/task/{}", self.base_url, id);
        let response = self
            .authorized(self.client.patch(&url))
            .json(task)
            .send()
            .await?;

        self.handle_response(response).await
    }
}
