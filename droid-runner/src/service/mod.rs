//! Service layer
//!
//! Services contain the agent's business logic: executing tasks, running
//! the pod lifecycle scripts, and committing results through the
//! repositories.

pub mod committer;
pub mod execution;
pub mod hooks;

// Re-export traits
pub use execution::ExecutionService;

// Re-export implementations
pub use committer::{LogPathTemplate, ResultCommitter};
pub use execution::ShellExecutionService;
pub use hooks::{PreparationError, after_task, prepare_pod};
