//! Core domain types
//!
//! These types are shared between the runner (which produces task results)
//! and the clients (which persist them and report on runs).

pub mod job_name;
pub mod metadata;
pub mod result;
pub mod run;
pub mod task;

pub use job_name::{JobName, JobNameError};
pub use metadata::{DroidMetadata, MetadataError};
pub use result::{TaskOutcome, TaskResult, TaskStatus};
pub use run::Run;
pub use task::{Task, TaskDecodeError, TaskSetting};
