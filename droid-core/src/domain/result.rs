//! Task result domain type
//!
//! The durable record of one task's outcome. Created by the runner, assigned
//! an identifier by the result store, and optionally updated once with the
//! computed log and recording paths.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::domain::task::TaskSetting;
use crate::names;

/// Whether the task was executed at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Completed,
    Uncompleted,
}

/// Outcome of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskOutcome {
    /// The test process exited with status 0
    Passed,
    /// The test process exited with a non-zero status
    Failed,
    /// The test could not be run or did not finish
    Error,
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutcome::Passed => write!(f, "Passed"),
            TaskOutcome::Failed => write!(f, "Failed"),
            TaskOutcome::Error => write!(f, "Error"),
        }
    }
}

/// Result of one task, as persisted by the result store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Identifier assigned by the result store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default)]
    pub name: String,

    pub run_id: i64,

    pub status: TaskStatus,

    pub result: TaskOutcome,

    /// Wall-clock duration in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,

    #[serde(default)]
    pub result_details: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<TaskSetting>,
}

impl TaskResult {
    /// Result of a task that was executed
    pub fn completed(
        setting: &TaskSetting,
        outcome: TaskOutcome,
        duration_ms: u64,
        pod_name: &str,
        run_id: i64,
    ) -> Self {
        let mut result_details = HashMap::new();
        result_details.insert(names::KEY_AGENT.to_string(), pod_name.to_string());

        Self {
            id: None,
            name: setting.identifier().to_string(),
            run_id,
            status: TaskStatus::Completed,
            result: outcome,
            duration: Some(duration_ms),
            result_details,
            settings: Some(setting.clone()),
        }
    }

    /// Result of a delivery that could not be turned into a task
    pub fn uncompleted(pod_name: &str, run_id: i64, error: impl Into<String>) -> Self {
        let mut result_details = HashMap::new();
        result_details.insert(names::KEY_AGENT.to_string(), pod_name.to_string());
        result_details.insert(names::KEY_ERROR.to_string(), error.into());

        Self {
            id: None,
            name: String::new(),
            run_id,
            status: TaskStatus::Uncompleted,
            result: TaskOutcome::Error,
            duration: None,
            result_details,
            settings: None,
        }
    }

    pub fn detail(&self, key: &str) -> Option<&str> {
        self.result_details.get(key).map(String::as_str)
    }

    pub fn set_detail(&mut self, key: &str, value: impl Into<String>) {
        self.result_details.insert(key.to_string(), value.into());
    }

    /// Relative path of the recording file for this task
    ///
    /// Returns `None` until the store has assigned an identifier.
    pub fn record_path(&self) -> Option<String> {
        self.id
            .map(|id| format!("{}/recording_{}.yaml", self.run_id, id))
    }

    /// Relative path of the captured output for this task
    ///
    /// Returns `None` until the store has assigned an identifier.
    pub fn log_path(&self) -> Option<String> {
        self.id.map(|id| format!("{}/task_{}.log", self.run_id, id))
    }
}
