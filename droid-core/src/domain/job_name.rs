//! Job name domain type
//!
//! Every job scheduled for a run is named `<product>-<runID>-<randomID>`.
//! The product may itself contain hyphens, so the name is split at its last
//! two hyphens.

use std::fmt;
use thiserror::Error;

/// Errors produced while decomposing a job name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobNameError {
    #[error("{0:?} is not in format <product>-<runID>-<randomID>")]
    Format(String),
}

/// A job name decomposed into its three segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobName {
    raw: String,
    product: String,
    run_id: String,
    random_id: String,
}

impl JobName {
    /// Parses a job name, splitting at the last two hyphens
    ///
    /// All three segments must be non-empty.
    pub fn parse(name: &str) -> Result<Self, JobNameError> {
        let format_error = || JobNameError::Format(name.to_string());

        let mut parts = name.rsplitn(3, '-');
        let random_id = parts.next().ok_or_else(format_error)?;
        let run_id = parts.next().ok_or_else(format_error)?;
        let product = parts.next().ok_or_else(format_error)?;

        if product.is_empty() || run_id.is_empty() || random_id.is_empty() {
            return Err(format_error());
        }

        Ok(Self {
            raw: name.to_string(),
            product: product.to_string(),
            run_id: run_id.to_string(),
            random_id: random_id.to_string(),
        })
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn random_id(&self) -> &str {
        &self.random_id
    }

    /// The full name, also used as the queue name on the broker
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
