//! Notification DTOs

use serde::{Deserialize, Serialize};

/// Request asking the email service to send a run report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub run_id: String,
    /// Comma-joined email addresses
    pub receivers: String,
    pub template: String,
}

/// Request asking the report service to refresh the product dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub product: String,
    #[serde(rename = "runID")]
    pub run_id: i64,
}
