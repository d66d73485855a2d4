//! Outbound HTTP client construction
//!
//! All upstream avatar requests share one `reqwest::Client` so connections are
//! pooled across workers. The client carries a total per-request timeout; the
//! caller's own wait budget is enforced separately by the avatar service.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::errors::AppResult;

/// Builder for the shared upstream client
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    request_timeout: Duration,
    user_agent: String,
}

impl HttpClientFactory {
    /// Create a factory with a total per-request timeout
    /// Automatically generates a standard user agent format
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            request_timeout,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Build the client used for avatar image and probe requests
    pub fn create_avatar_client(&self) -> AppResult<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("image/jpeg,image/png,*/*"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        debug!(
            "Creating avatar HTTP client (timeout: {:?}, user agent: {})",
            self.request_timeout, self.user_agent
        );

        let client = Client::builder()
            .timeout(self.request_timeout)
            .user_agent(self.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(client)
    }
}
