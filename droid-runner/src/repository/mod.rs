//! Repository layer
//!
//! Repositories are thin adapters over the agent's external collaborators:
//! the task broker, the result store, the artifact mount and the secret
//! mount. They contain no business logic.
//!
//! All repositories are trait-based to enable testing and mocking.

mod broker;
mod logs;
mod results;
mod secrets;

// Re-export traits
pub use broker::TaskBroker;
pub use logs::LogStore;
pub use results::ResultStore;
pub use secrets::SecretStore;

// Re-export implementations
pub use broker::{AmqpBroker, Delivery};
pub use logs::ArtifactLogStore;
pub use secrets::MountedSecretStore;
