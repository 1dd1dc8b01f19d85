//! Agent configuration
//!
//! Configuration is read once at startup from a key lookup (the process
//! environment in production) and passed by value to every component. The
//! required keys are all checked before failing so operators can fix every
//! problem in one pass.

use anyhow::Context as _;
use droid_core::domain::JobName;
use droid_core::names;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Subprocesses (pod preparation, tasks, after-task hooks) run without a
/// time limit unless one is configured.
pub const DEFAULT_PROCESS_TIMEOUT: Option<Duration> = None;

/// Keys that must be present before the agent touches the queue
pub const REQUIRED_KEYS: [&str; 3] = [
    names::ENV_INTERNAL_COMMUNICATION_KEY,
    names::ENV_JOB_NAME,
    names::ENV_POD_NAME,
];

/// Every required key that was absent from the configuration source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("the following required environment variables are missing:\n{}", list_keys(.missing))]
pub struct MissingConfigError {
    pub missing: Vec<&'static str>,
}

fn list_keys(keys: &[&str]) -> String {
    keys.iter().map(|key| format!("\t{}\n", key)).collect()
}

/// Agent configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of this pod, recorded as the agent of every result
    pub pod_name: String,

    /// Name of the job, `<product>-<runID>-<randomID>`
    pub job_name: String,

    /// Internal communication key used to authenticate with the store
    pub internal_key: String,

    /// AMQP URL of the task broker
    pub broker_url: String,

    /// Base URL of the result store API
    pub store_url: String,

    /// Directory where product secrets are mounted
    pub secrets_path: PathBuf,

    /// Directory where artifacts (task logs, recordings) are mounted
    pub artifacts_path: PathBuf,

    /// Optional script executed once before the first task
    pub prepare_pod_script: PathBuf,

    /// Optional script executed after every task
    pub after_task_script: PathBuf,

    /// Time limit for every subprocess, `None` for unbounded
    pub process_timeout: Option<Duration>,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Required environment variables:
    /// - A01_INTERNAL_COMKEY
    /// - ENV_JOB_NAME
    /// - ENV_POD_NAME
    ///
    /// Optional environment variables:
    /// - A01_TASKBROKER_URL (default: amqp://a01-taskbroker-svc:5672/%2f)
    /// - A01_STORE_URL (default: http://data-store-svc/api)
    /// - A01_SECRETS_PATH (default: /mnt/secrets)
    /// - A01_ARTIFACTS_PATH (default: /mnt/artifacts)
    /// - A01_PREPARE_POD_SCRIPT (default: /app/prepare_pod)
    /// - A01_AFTER_TASK_SCRIPT (default: /app/after_test)
    /// - DROID_PROCESS_TIMEOUT (seconds, default: unbounded)
    pub fn from_env() -> Result<Self, MissingConfigError> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup
    pub fn from_source<F>(lookup: F) -> Result<Self, MissingConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&'static str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|&key| value(key).is_none())
            .collect();

        if !missing.is_empty() {
            return Err(MissingConfigError { missing });
        }

        let required = |key: &str| value(key).unwrap_or_default();
        let path_or = |key: &str, default: &str| {
            PathBuf::from(value(key).unwrap_or_else(|| default.to_string()))
        };

        let process_timeout = match value(names::ENV_PROCESS_TIMEOUT) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    warn!(
                        "Ignoring invalid {}={:?}, subprocesses run unbounded",
                        names::ENV_PROCESS_TIMEOUT,
                        raw
                    );
                    DEFAULT_PROCESS_TIMEOUT
                }
            },
            None => DEFAULT_PROCESS_TIMEOUT,
        };

        Ok(Self {
            pod_name: required(names::ENV_POD_NAME),
            job_name: required(names::ENV_JOB_NAME),
            internal_key: required(names::ENV_INTERNAL_COMMUNICATION_KEY),
            broker_url: value(names::ENV_TASK_BROKER_URL)
                .unwrap_or_else(|| format!("amqp://{}:5672/%2f", names::DNS_NAME_TASK_BROKER)),
            store_url: value(names::ENV_STORE_URL)
                .unwrap_or_else(|| format!("http://{}/api", names::DNS_NAME_TASK_STORE)),
            secrets_path: path_or(names::ENV_SECRETS_PATH, names::PATH_MOUNT_SECRETS),
            artifacts_path: path_or(names::ENV_ARTIFACTS_PATH, names::PATH_MOUNT_ARTIFACTS),
            prepare_pod_script: path_or(
                names::ENV_PREPARE_POD_SCRIPT,
                names::PATH_SCRIPT_PREPARE_POD,
            ),
            after_task_script: path_or(names::ENV_AFTER_TASK_SCRIPT, names::PATH_SCRIPT_AFTER_TASK),
            process_timeout,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.broker_url.starts_with("amqp://") && !self.broker_url.starts_with("amqps://") {
            anyhow::bail!("broker_url must start with amqp:// or amqps://");
        }

        if !self.store_url.starts_with("http://") && !self.store_url.starts_with("https://") {
            anyhow::bail!("store_url must start with http:// or https://");
        }

        if self.process_timeout.is_some_and(|t| t.is_zero()) {
            anyhow::bail!("process_timeout must be greater than 0");
        }

        Ok(())
    }

    /// Decomposes the job name into the run context of this agent
    pub fn run_context(&self) -> anyhow::Result<RunContext> {
        let job = JobName::parse(&self.job_name)?;
        let run_id = job
            .run_id()
            .parse::<i64>()
            .with_context(|| format!("run ID {:?} of job {} is not numeric", job.run_id(), job))?;

        Ok(RunContext {
            job,
            run_id,
            pod_name: self.pod_name.clone(),
        })
    }
}

/// Identity of the run this agent works for, built once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub job: JobName,
    pub run_id: i64,
    pub pod_name: String,
}

impl RunContext {
    pub fn product(&self) -> &str {
        self.job.product()
    }

    /// Queue holding this job's tasks
    pub fn queue_name(&self) -> &str {
        self.job.as_str()
    }
}
