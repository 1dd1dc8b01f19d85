//! Scheduler layer for the agent
//!
//! This layer drives the agent's lifecycle: connecting to the job's queue,
//! preparing the pod, then draining the queue one task at a time until it
//! is empty.

pub mod task_loop;

pub use task_loop::{Collaborators, TaskLoop};
