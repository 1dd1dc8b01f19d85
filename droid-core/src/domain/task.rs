//! Task setting domain type
//!
//! A task setting is the execution request published to the run's queue.
//! Its wire format is JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

const KEY_COMMAND: &str = "command";
const KEY_IDENTIFIER: &str = "identifier";

/// Errors produced while decoding a delivery body into a task setting
#[derive(Debug, Error)]
pub enum TaskDecodeError {
    #[error("failed to unmarshal a delivery's body in JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("task {0:?} has no execution command")]
    MissingCommand(String),
}

/// Execution request for a single test
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSetting {
    #[serde(rename = "ver", default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Parameters used to launch the test process
    #[serde(default)]
    pub execution: HashMap<String, String>,

    /// Labels identifying the test
    #[serde(default)]
    pub classifier: HashMap<String, String>,

    #[serde(default, alias = "msic", skip_serializing_if = "HashMap::is_empty")]
    pub misc: HashMap<String, String>,
}

/// A decoded delivery: the setting and the command it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub setting: TaskSetting,
    /// Trimmed, non-empty shell command
    pub command: String,
}

impl Task {
    /// Decodes a delivery body
    ///
    /// Fails when the body is not a JSON task setting or carries no command.
    pub fn decode(body: &[u8]) -> Result<Self, TaskDecodeError> {
        let setting: TaskSetting = serde_json::from_slice(body)?;

        let Some(command) = setting.command().map(str::to_string) else {
            return Err(TaskDecodeError::MissingCommand(
                setting.identifier().to_string(),
            ));
        };

        Ok(Self { setting, command })
    }
}

impl TaskSetting {
    /// Identifier of the test, empty when the publisher did not set one
    pub fn identifier(&self) -> &str {
        self.classifier
            .get(KEY_IDENTIFIER)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Shell command that runs the test
    pub fn command(&self) -> Option<&str> {
        self.execution
            .get(KEY_COMMAND)
            .map(|command| command.trim())
            .filter(|command| !command.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_setting() {
        let body = br#"{
            "ver": "1.0",
            "execution": {"command": "python -m pytest tests/test_vm.py"},
            "classifier": {"identifier": "tests/test_vm.py::test_create"}
        }"#;

        let Task { setting, command } = Task::decode(body).unwrap();
        assert_eq!(command, "python -m pytest tests/test_vm.py");
        assert_eq!(setting.version, "1.0");
        assert_eq!(setting.identifier(), "tests/test_vm.py::test_create");
        assert_eq!(setting.command(), Some("python -m pytest tests/test_vm.py"));
        assert!(setting.misc.is_empty());
    }

    #[test]
    fn test_decode_carries_trimmed_command() {
        let body = br#"{"execution": {"command": "  echo padded \n"}}"#;

        let task = Task::decode(body).unwrap();
        assert_eq!(task.command, "echo padded");
        assert_eq!(task.setting.command(), Some("echo padded"));
    }

    #[test]
    fn test_decode_accepts_legacy_misc_key() {
        let body = br#"{"execution": {"command": "true"}, "msic": {"owner": "qa"}}"#;

        let setting = Task::decode(body).unwrap().setting;
        assert_eq!(setting.misc.get("owner"), Some(&"qa".to_string()));
        assert_eq!(setting.identifier(), "");
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        let err = Task::decode(b"{not json").unwrap_err();
        assert!(matches!(err, TaskDecodeError::Json(_)));
        assert!(err.to_string().starts_with("failed to unmarshal"));
    }

    #[test]
    fn test_decode_rejects_blank_command() {
        let body = br#"{"execution": {"command": "  "}, "classifier": {"identifier": "t1"}}"#;

        let err = Task::decode(body).unwrap_err();
        assert!(matches!(err, TaskDecodeError::MissingCommand(ref id) if id == "t1"));
    }
}
