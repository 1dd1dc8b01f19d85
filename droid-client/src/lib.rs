//! Droid HTTP Client
//!
//! Typed HTTP clients for the services the Droid agent talks to:
//! - the result store, which persists task results
//! - the email and report services, which are notified about runs
//!
//! # Example
//!
//! ```no_run
//! use droid_client::StoreClient;
//! use droid_core::domain::TaskResult;
//!
//! #[tokio::main]
//! async fn main() -> droid_client::Result<()> {
//!     let client = StoreClient::new("http://data-store-svc/api", "secret-key");
//!
//!     let task = TaskResult::uncompleted("droid-0", 42, "bad payload");
//!     let created = client.create_task(&task).await?;
//!
//!     println!("Created task: {:?}", created.id);
//!     Ok(())
//! }
//! ```

pub mod error;
mod notifications;
mod tasks;

pub use error::{ClientError, Result};
pub use notifications::NotificationClient;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// HTTP client for the result store API
#[derive(Debug, Clone)]
pub struct StoreClient {
    /// Base URL of the store (e.g., "http://data-store-svc/api")
    base_url: String,
    /// Internal communication key sent with every request
    auth_key: String,
    /// HTTP client instance
    client: Client,
}

impl StoreClient {
    /// Create a new store client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the store API
    /// * `auth_key` - The internal communication key
    pub fn new(base_url: impl Into<String>, auth_key: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_key: auth_key.into(),
            client: Client::new(),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, &self.auth_key)
    }

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = StoreClient::new("http://localhost:8080", "key");
        assert_eq!(client.base_url, "http://localhost:8080");
        assert_eq!(client.auth_key, "key");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = StoreClient::new("http://localhost:8080/api/", "key");
        assert_eq!(client.base_url, "http://localhost:8080/api");
    }
}
