//! Droid
//!
//! A task-executing agent running inside a pod of a test-automation job.
//!
//! Architecture:
//! - Configuration: Load settings from the environment
//! - Repositories: Task broker (AMQP), result store (HTTP), artifact and
//!   secret mounts
//! - Services: Task execution, pod lifecycle scripts, result commits
//! - Scheduler: Queue draining and lifecycle management
//!
//! The agent pulls tasks from its job's queue one at a time, runs them as
//! shell commands, records their results and exits once the queue is empty.

mod config;
mod process;
mod repository;
mod scheduler;
mod service;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use droid_client::StoreClient;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, RunContext};
use crate::repository::{AmqpBroker, ArtifactLogStore, MountedSecretStore};
use crate::scheduler::{Collaborators, TaskLoop};
use crate::service::ShellExecutionService;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "droid_runner=info,droid_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "A01 Droid Engine.\nVersion: {}.\nCommit: {}.\n",
        env!("CARGO_PKG_VERSION"),
        option_env!("DROID_SOURCE_COMMIT").unwrap_or("Unknown")
    );

    if let Err(e) = run().await {
        error!("Droid failed: {:#}", e);
        return Err(e);
    }

    Ok(())
}

async fn run() -> Result<()> {
    let (config, context) = load_config()?;
    info!(
        "Loaded configuration: job={}, pod={}, broker_url={}, store_url={}",
        config.job_name, config.pod_name, config.broker_url, config.store_url
    );

    let broker = AmqpBroker::connect(&config.broker_url)
        .await
        .context("Failed to reach the task broker")?;
    info!("Task broker connection established");

    let store = StoreClient::new(config.store_url.clone(), config.internal_key.clone());
    let collaborators = Collaborators {
        broker: Arc::new(broker),
        secrets: Arc::new(MountedSecretStore::new(&config.secrets_path)),
        store: Arc::new(store),
        logs: Arc::new(ArtifactLogStore::new(&config.artifacts_path)),
        execution: Arc::new(ShellExecutionService::new(
            &context,
            config.process_timeout,
        )),
    };

    let summary = TaskLoop::new(config, context, collaborators).run().await?;
    info!(
        "Processed {} task(s), acknowledged {}",
        summary.processed, summary.acknowledged
    );

    Ok(())
}

/// Loads and validates configuration from environment variables
fn load_config() -> Result<(Config, RunContext)> {
    let config = Config::from_env()?;
    config.validate()?;
    let context = config.run_context()?;
    Ok((config, context))
}
