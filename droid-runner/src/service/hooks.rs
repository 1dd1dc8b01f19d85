//! Pod lifecycle scripts
//!
//! Two optional executables customize a pod:
//! - a preparation script, run once before the first task; its failure
//!   blocks every task on this pod
//! - an after-task script, run after every task with the artifacts mount and
//!   the JSON task result as arguments; its failure is only logged
//!
//! A missing script is not an error.

use droid_core::domain::TaskResult;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{error, info, warn};

use crate::process::{CapturedRun, ProcessError, run_captured};

/// Failure of the pod preparation script
#[derive(Debug, Error)]
#[error("pod preparation failed: {reason}")]
pub struct PreparationError {
    pub reason: String,
    /// Combined output of the script
    pub output: String,
}

/// What happened to the after-task script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    Skipped,
    Succeeded,
    Failed,
}

/// Runs the pod preparation script once, before the task loop
pub async fn prepare_pod(path: &Path, timeout: Option<Duration>) -> Result<(), PreparationError> {
    if !is_present(path).await {
        info!("skipping pod preparation, {} not present", path.display());
        return Ok(());
    }

    let failure = match run_captured(Command::new(path), timeout).await {
        Ok(run) if run.status.success() => {
            log_success("pod prepared", &run);
            return Ok(());
        }
        Ok(run) => PreparationError {
            reason: run.status.to_string(),
            output: run.output_text(),
        },
        Err(e) => PreparationError {
            reason: e.to_string(),
            output: String::from_utf8_lossy(e.output()).into_owned(),
        },
    };

    log_failure("pod preparation failed", &failure.reason, &failure.output);
    Err(failure)
}

/// Runs the after-task script for a committed result
pub async fn after_task(
    path: &Path,
    artifacts_mount: &Path,
    result: &TaskResult,
    timeout: Option<Duration>,
) -> HookOutcome {
    if !is_present(path).await {
        info!("no after task action found");
        return HookOutcome::Skipped;
    }

    info!("Executing after task {}.", path.display());

    let encoded = match serde_json::to_string(result) {
        Ok(encoded) => encoded,
        Err(e) => {
            error!("unable to encode task to JSON: {}", e);
            return HookOutcome::Failed;
        }
    };

    let mut command = Command::new(path);
    command.arg(artifacts_mount).arg(encoded);

    match run_captured(command, timeout).await {
        Ok(run) if run.status.success() => {
            log_success("after-task succeeded", &run);
            HookOutcome::Succeeded
        }
        Ok(run) => {
            log_failure("after-task failed", &run.status.to_string(), &run.output_text());
            HookOutcome::Failed
        }
        Err(e) => {
            log_process_error("after-task failed", &e);
            HookOutcome::Failed
        }
    }
}

/// Only a confirmed absence skips a script; a failed lookup still runs it
async fn is_present(path: &Path) -> bool {
    match tokio::fs::try_exists(path).await {
        Ok(present) => present,
        Err(e) => {
            warn!("Unable to check {}: {}", path.display(), e);
            true
        }
    }
}

fn log_success(affirmative: &str, run: &CapturedRun) {
    if run.output.is_empty() {
        info!("{}", affirmative);
    } else {
        info!("{} output:\n{}", affirmative, run.output_text());
    }
}

fn log_failure(negative: &str, reason: &str, output: &str) {
    if output.is_empty() {
        error!("{}\n\terr: {}", negative, reason);
    } else {
        error!("{}\n\terr: {}\n\toutput:\n{}", negative, reason, output);
    }
}

fn log_process_error(negative: &str, e: &ProcessError) {
    log_failure(negative, &e.to_string(), &String::from_utf8_lossy(e.output()));
}
