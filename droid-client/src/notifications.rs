//! Notification services
//!
//! Fire-and-forget calls to the email service (run reports) and the report
//! service (dashboard refreshes). Any response other than 200 is a failure;
//! nothing is retried.

use droid_core::domain::Run;
use droid_core::dto::notification::{RefreshRequest, ReportRequest};
use droid_core::names;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{ClientError, Result};

/// HTTP client for the email and report services
#[derive(Debug, Clone)]
pub struct NotificationClient {
    email_endpoint: String,
    report_endpoint: String,
    client: Client,
}

impl NotificationClient {
    /// Create a client for explicit service endpoints
    pub fn new(email_endpoint: impl Into<String>, report_endpoint: impl Into<String>) -> Self {
        Self {
            email_endpoint: email_endpoint.into(),
            report_endpoint: report_endpoint.into(),
            client: Client::new(),
        }
    }

    /// Create a client for the in-cluster service names
    pub fn in_cluster() -> Self {
        Self::new(
            format!("http://{}/report", names::DNS_NAME_EMAIL_SERVICE),
            format!("http://{}/report", names::DNS_NAME_REPORT_SERVICE),
        )
    }

    /// Ask the email service to send a report for a run
    ///
    /// Team receivers are dropped unless the run is official; the run's own
    /// email address is always added. Returns `Ok(false)` when nobody is left
    /// to notify.
    pub async fn send_report(
        &self,
        run: &Run,
        receivers: &[String],
        template_url: &str,
    ) -> Result<bool> {
        let Some(request) = report_request(run, receivers, template_url) else {
            warn!("no recipients to send the report");
            return Ok(false);
        };

        debug!("report message body: {:?}", request);
        self.post(&self.email_endpoint, &request).await?;

        info!("report sent");
        Ok(true)
    }

    /// Ask the report service to refresh the product dashboard
    ///
    /// Only official runs are refreshed. Returns `Ok(false)` when skipped.
    pub async fn refresh_dashboard(&self, run: &Run, product: &str) -> Result<bool> {
        if !run.is_official() {
            info!("skip dashboard refresh: run is not official");
            return Ok(false);
        }

        let request = RefreshRequest {
            product: product.to_string(),
            run_id: run.id,
        };
        self.post(&self.report_endpoint, &request).await?;

        info!("dashboard refresh requested");
        Ok(true)
    }

    /// Send both notifications for a finished run, logging failures
    pub async fn notify_run_finished(
        &self,
        run: &Run,
        product: &str,
        receivers: &[String],
        template_url: &str,
    ) {
        if let Err(e) = self.send_report(run, receivers, template_url).await {
            error!("failed to send report for run {}: {}", run.id, e);
        }

        if let Err(e) = self.refresh_dashboard(run, product).await {
            error!("failed to refresh dashboard for run {}: {}", run.id, e);
        }
    }

    async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<()> {
        let response = self.client.post(endpoint).json(body).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::api_error(status.as_u16(), message));
        }

        Ok(())
    }
}

fn report_request(run: &Run, receivers: &[String], template_url: &str) -> Option<ReportRequest> {
    let mut recipients: Vec<&str> = if run.is_official() {
        receivers.iter().map(String::as_str).collect()
    } else {
        Vec::new()
    };

    if let Some(email) = run.user_email() {
        recipients.push(email);
    }

    if recipients.is_empty() {
        return None;
    }

    Some(ReportRequest {
        run_id: run.id.to_string(),
        receivers: recipients.join(","),
        template: template_url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value as JsonValue, json};
    use std::sync::{Arc, Mutex};

    fn run(settings: JsonValue) -> Run {
        serde_json::from_value(json!({ "id": 42, "settings": settings })).unwrap()
    }

    fn team() -> Vec<String> {
        vec!["a@example.com".to_string(), "b@example.com".to_string()]
    }

    #[test]
    fn test_report_request_official_run() {
        let run = run(json!({
            "a01.reserved.remark": "official",
            "a01.reserved.useremail": "me@example.com"
        }));

        let request = report_request(&run, &team(), "https://t/report.html").unwrap();
        assert_eq!(request.run_id, "42");
        assert_eq!(request.receivers, "a@example.com,b@example.com,me@example.com");
        assert_eq!(request.template, "https://t/report.html");
    }

    #[test]
    fn test_report_request_unofficial_run_keeps_owner_only() {
        let run = run(json!({ "a01.reserved.useremail": "me@example.com" }));

        let request = report_request(&run, &team(), "t").unwrap();
        assert_eq!(request.receivers, "me@example.com");
    }

    #[test]
    fn test_report_request_without_recipients() {
        assert!(report_request(&run(json!({})), &team(), "t").is_none());
    }

    async fn serve(status: AxumStatus) -> anyhow::Result<(String, Arc<Mutex<Vec<JsonValue>>>)> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let app = Router::new().route(
            "/report",
            post(move |Json(body): Json<JsonValue>| {
                let recorder = recorder.clone();
                async move {
                    recorder.lock().unwrap().push(body);
                    status
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok((format!("http://{}/report", addr), seen))
    }

    #[tokio::test]
    async fn test_refresh_official_run() -> anyhow::Result<()> {
        let (endpoint, seen) = serve(AxumStatus::OK).await?;
        let client = NotificationClient::new("http://127.0.0.1:9/report", endpoint);

        let official = run(json!({ "a01.reserved.remark": "official" }));
        assert!(client.refresh_dashboard(&official, "azure-cli").await?);

        let bodies = seen.lock().unwrap();
        assert_eq!(bodies[0], json!({ "product": "azure-cli", "runID": 42 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_skipped_for_unofficial_run() -> anyhow::Result<()> {
        let (endpoint, seen) = serve(AxumStatus::OK).await?;
        let client = NotificationClient::new("http://127.0.0.1:9/report", endpoint);

        assert!(!client.refresh_dashboard(&run(json!({})), "azure-cli").await?);
        assert!(seen.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_report_non_200_is_error() -> anyhow::Result<()> {
        let (endpoint, seen) = serve(AxumStatus::ACCEPTED).await?;
        let client = NotificationClient::new(endpoint, "http://127.0.0.1:9/report");

        let run = run(json!({ "a01.reserved.useremail": "me@example.com" }));
        let err = client.send_report(&run, &team(), "t").await.unwrap_err();

        assert!(matches!(err, ClientError::ApiError { status: 202, .. }));
        assert_eq!(seen.lock().unwrap()[0]["receivers"], "me@example.com");
        Ok(())
    }
}
