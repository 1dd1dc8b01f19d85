//! Data Transfer Objects for inter-service communication
//!
//! Request bodies sent from the agent side to the notification services.

pub mod notification;
