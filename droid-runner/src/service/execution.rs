//! Execution service
//!
//! Turns a delivery body into a task result:
//! - Decoding the body into a task setting
//! - Running the task's command and timing it
//! - Capturing its combined output
//!
//! Process failures are reported as task outcomes, never as errors.

use async_trait::async_trait;
use droid_core::domain::{Task, TaskOutcome, TaskResult};
use droid_core::names;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{error, info};

use crate::config::RunContext;
use crate::process::run_captured;

/// Shell used to interpret task commands
const TASK_SHELL: &str = "/bin/sh";

/// Outcome of handling one delivery body
#[derive(Debug)]
pub struct Execution {
    pub result: TaskResult,
    /// Combined output of the task, empty when nothing ran
    pub output: Vec<u8>,
}

/// Service trait for executing tasks
#[async_trait]
pub trait ExecutionService: Send + Sync {
    /// Executes the task carried by a delivery body
    async fn execute(&self, body: &[u8]) -> Execution;
}

/// Runs task commands through the shell
pub struct ShellExecutionService {
    pod_name: String,
    run_id: i64,
    timeout: Option<Duration>,
}

impl ShellExecutionService {
    /// Creates an execution service for this agent's run
    ///
    /// # Arguments
    /// * `context` - Run the produced results belong to
    /// * `timeout` - Time limit for each task, `None` for unbounded
    pub fn new(context: &RunContext, timeout: Option<Duration>) -> Self {
        Self {
            pod_name: context.pod_name.clone(),
            run_id: context.run_id,
            timeout,
        }
    }

    async fn run(&self, task: &Task) -> Execution {
        let setting = &task.setting;

        let mut command = Command::new(TASK_SHELL);
        command.arg("-c").arg(&task.command);

        let started = Instant::now();
        match run_captured(command, self.timeout).await {
            Ok(run) => {
                let outcome = if run.status.success() {
                    TaskOutcome::Passed
                } else {
                    TaskOutcome::Failed
                };
                let result = TaskResult::completed(
                    setting,
                    outcome,
                    millis(run.elapsed),
                    &self.pod_name,
                    self.run_id,
                );
                Execution {
                    result,
                    output: run.output,
                }
            }
            Err(e) => {
                error!("Task {} did not finish: {}", setting.identifier(), e);
                let output = e.output().to_vec();
                let mut result = TaskResult::completed(
                    setting,
                    TaskOutcome::Error,
                    millis(started.elapsed()),
                    &self.pod_name,
                    self.run_id,
                );
                result.set_detail(names::KEY_ERROR, e.to_string());
                Execution { result, output }
            }
        }
    }
}

#[async_trait]
impl ExecutionService for ShellExecutionService {
    async fn execute(&self, body: &[u8]) -> Execution {
        let task = match Task::decode(body) {
            Ok(task) => task,
            Err(e) => {
                let message = e.to_string();
                error!("{}", message);
                return Execution {
                    result: TaskResult::uncompleted(&self.pod_name, self.run_id, message),
                    output: Vec::new(),
                };
            }
        };

        info!("Run task {}", task.setting.identifier());
        let execution = self.run(&task).await;
        info!(
            "Task {} finished: {} in {} ms",
            task.setting.identifier(),
            execution.result.result,
            execution.result.duration.unwrap_or_default()
        );
        execution
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
