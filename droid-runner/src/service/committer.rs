//! Result committer
//!
//! Persists a task result and its captured output. Every step is best
//! effort: failures are logged and the remaining steps still run.
//!
//! When the product configures a log path template, the committed result is
//! updated once more with the public locations of its log and recording.

use droid_core::domain::TaskResult;
use droid_core::names;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::repository::{LogStore, ResultStore};

/// Rejected log path template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("log path template must contain exactly one {placeholder:?}, found {found}")]
pub struct TemplateError {
    placeholder: &'static str,
    found: usize,
}

/// Template turning a relative artifact path into a public location
///
/// Contains exactly one `{}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPathTemplate(String);

impl LogPathTemplate {
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        let raw = raw.trim();
        let found = raw.matches(names::LOG_PATH_PLACEHOLDER).count();
        if found != 1 {
            return Err(TemplateError {
                placeholder: names::LOG_PATH_PLACEHOLDER,
                found,
            });
        }

        Ok(Self(raw.to_string()))
    }

    /// Substitutes the placeholder with a relative path
    pub fn render(&self, relative: &str) -> String {
        self.0.replacen(names::LOG_PATH_PLACEHOLDER, relative, 1)
    }
}

/// Commits task results through the store and log repositories
pub struct ResultCommitter {
    store: Arc<dyn ResultStore>,
    logs: Arc<dyn LogStore>,
    template: Option<LogPathTemplate>,
}

impl ResultCommitter {
    pub fn new(
        store: Arc<dyn ResultStore>,
        logs: Arc<dyn LogStore>,
        template: Option<LogPathTemplate>,
    ) -> Self {
        Self {
            store,
            logs,
            template,
        }
    }

    /// Runs commit-new, save-log and, with a template, commit-changes
    ///
    /// Returns the result as last known, for the after-task hook.
    pub async fn commit(&self, result: TaskResult, output: &[u8]) -> TaskResult {
        let mut result = self.commit_new(result).await;
        let log_path = self.save_log(&result, output).await;

        if self.template.is_some() {
            self.commit_changes(&mut result, log_path.as_deref()).await;
        }

        result
    }

    /// Persists a new result
    ///
    /// On failure the input result is returned without an identifier.
    pub async fn commit_new(&self, result: TaskResult) -> TaskResult {
        match self.store.create(&result).await {
            Ok(created) => {
                info!("Committed task {:?} ({})", created.id, created.name);
                created
            }
            Err(e) => {
                error!("Failed to commit a new task: {:#}", e);
                result
            }
        }
    }

    /// Saves the captured output of a committed result
    pub async fn save_log(&self, result: &TaskResult, output: &[u8]) -> Option<String> {
        match self.logs.save(result, output).await {
            Ok(location) => {
                info!("Saved task log to {}", location);
                Some(location)
            }
            Err(e) => {
                error!("Failed to save task log: {:#}", e);
                None
            }
        }
    }

    /// Rewrites the log and record paths through the template and persists
    ///
    /// Does nothing without a template, or when the result was never
    /// committed. The earlier commit is never rolled back.
    pub async fn commit_changes(&self, result: &mut TaskResult, log_path: Option<&str>) {
        let Some(template) = &self.template else {
            return;
        };

        if result.id.is_none() {
            warn!("Task {:?} was not committed, skipping commit changes", result.name);
            return;
        }

        match log_path {
            Some(log_path) => result.set_detail(names::KEY_TASK_LOG_PATH, template.render(log_path)),
            None => warn!("No task log location, leaving the log path unset"),
        }

        if let Some(record_path) = result.record_path() {
            result.set_detail(names::KEY_TASK_RECORD_PATH, template.render(&record_path));
        }

        match self.store.update(result).await {
            Ok(updated) => *result = updated,
            Err(e) => error!("{:#}", e),
        }
    }
}
