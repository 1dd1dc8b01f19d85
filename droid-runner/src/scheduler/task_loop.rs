//! Task loop
//!
//! Drains the job's queue one delivery at a time:
//! execute → commit → after-task hook → acknowledge.
//!
//! Only three conditions abort the loop: the broker cannot be reached, the
//! queue cannot be read, or pod preparation fails. Everything that goes wrong
//! while handling a delivery is logged and the delivery is still
//! acknowledged, even when its result could not be persisted.

use droid_core::names;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::{Config, RunContext};
use crate::repository::{Delivery, LogStore, ResultStore, SecretStore, TaskBroker};
use crate::service::{
    ExecutionService, LogPathTemplate, PreparationError, ResultCommitter, after_task, prepare_pod,
};

/// Conditions that terminate the agent
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("task broker failure: {0:#}")]
    Broker(anyhow::Error),

    #[error(transparent)]
    Preparation(#[from] PreparationError),
}

/// Lifecycle of the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Connecting,
    Preparing,
    Looping,
    Exit,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopState::Connecting => write!(f, "Connecting"),
            LoopState::Preparing => write!(f, "Preparing"),
            LoopState::Looping => write!(f, "Looping"),
            LoopState::Exit => write!(f, "Exit"),
        }
    }
}

/// Counters reported once the queue is drained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub processed: usize,
    pub acknowledged: usize,
}

/// External collaborators of the loop
pub struct Collaborators {
    pub broker: Arc<dyn TaskBroker>,
    pub secrets: Arc<dyn SecretStore>,
    pub store: Arc<dyn ResultStore>,
    pub logs: Arc<dyn LogStore>,
    pub execution: Arc<dyn ExecutionService>,
}

/// Consume–execute–commit–acknowledge loop for one job
pub struct TaskLoop {
    config: Config,
    context: RunContext,
    collaborators: Collaborators,
}

impl TaskLoop {
    /// Creates the loop from a validated configuration
    pub fn new(config: Config, context: RunContext, collaborators: Collaborators) -> Self {
        Self {
            config,
            context,
            collaborators,
        }
    }

    /// Runs until the queue is drained
    pub async fn run(&self) -> Result<LoopSummary, FatalError> {
        let queue = self.context.queue_name();

        transition(LoopState::Connecting);
        self.collaborators
            .broker
            .declare_queue(queue)
            .await
            .map_err(FatalError::Broker)?;
        info!("Connected to queue {}", queue);

        let committer = ResultCommitter::new(
            Arc::clone(&self.collaborators.store),
            Arc::clone(&self.collaborators.logs),
            self.load_log_path_template().await,
        );

        transition(LoopState::Preparing);
        prepare_pod(&self.config.prepare_pod_script, self.config.process_timeout).await?;

        transition(LoopState::Looping);
        let mut summary = LoopSummary::default();
        loop {
            let Some(delivery) = self
                .collaborators
                .broker
                .fetch(queue)
                .await
                .map_err(FatalError::Broker)?
            else {
                info!("No more task in the queue. Exiting successfully.");
                break;
            };

            self.process(&committer, &delivery).await;
            summary.processed += 1;

            match self.collaborators.broker.ack(&delivery).await {
                Ok(()) => {
                    info!("ACK");
                    summary.acknowledged += 1;
                }
                Err(e) => error!("Failed to ack delivery: {:#}", e),
            }
        }

        transition(LoopState::Exit);
        Ok(summary)
    }

    /// Executes one delivery and commits its result
    async fn process(&self, committer: &ResultCommitter, delivery: &Delivery) {
        debug!("Processing delivery {}", delivery.tag);

        let execution = self.collaborators.execution.execute(&delivery.body).await;
        let result = committer.commit(execution.result, &execution.output).await;

        after_task(
            &self.config.after_task_script,
            &self.config.artifacts_path,
            &result,
            self.config.process_timeout,
        )
        .await;
    }

    /// Looks up the product's log path template
    ///
    /// A missing, unreadable or malformed template disables commit-changes.
    async fn load_log_path_template(&self) -> Option<LogPathTemplate> {
        let product = self.context.product();
        let secret = self
            .collaborators
            .secrets
            .get(product, names::PRODUCT_SECRET_KEY_LOG_PATH_TEMPLATE)
            .await;

        let raw = match secret {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No log path template for product {}", product);
                return None;
            }
            Err(e) => {
                warn!("Failed to read log path template: {:#}", e);
                return None;
            }
        };

        match LogPathTemplate::parse(&String::from_utf8_lossy(&raw)) {
            Ok(template) => {
                info!("Using log path template for product {}", product);
                Some(template)
            }
            Err(e) => {
                error!("Ignoring log path template of {}: {}", product, e);
                None
            }
        }
    }
}

fn transition(state: LoopState) {
    debug!("Entering state {}", state);
}
