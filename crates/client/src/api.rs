//! REST client for the job service endpoints.
//!
//! Wraps brief submission, status lookup and the health probe using
//! [`reqwest`]. Each call is a single attempt; failures are normalised
//! into [`RequestError`] whose `Display` is the user-facing message.

use async_trait::async_trait;
use briefcast_core::{BriefRequest, StatusResponse, SubmitResponse};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::ClientConfig;

/// Errors from the job service API layer.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The HTTP request itself failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error detail from the body, or `HTTP <status>`.
        message: String,
    },

    /// A 2xx response whose body was not the expected JSON.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// The configured base URL cannot carry a request path.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// Operations the tracker needs from the job service.
#[async_trait]
pub trait BriefApi: Send + Sync {
    /// `POST /brief`.
    async fn submit(&self, request: &BriefRequest) -> Result<SubmitResponse, RequestError>;

    /// `GET /brief/{job_id}/status`.
    async fn fetch_status(&self, job_id: &str) -> Result<StatusResponse, RequestError>;

    /// `GET /health`.
    async fn health(&self) -> Result<HealthStatus, RequestError>;
}

/// HTTP client for a single job service instance.
#[derive(Debug, Clone)]
pub struct BriefApiClient {
    client: reqwest::Client,
    api_url: String,
}

impl BriefApiClient {
    /// Build a client with the configured base URL and request timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, RequestError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// `{api_url}/brief/{job_id}/status` with the job id as a single,
    /// percent-encoded path segment.
    pub fn status_url(&self, job_id: &str) -> Result<reqwest::Url, RequestError> {
        let mut url = reqwest::Url::parse(&self.api_url)
            .map_err(|e| RequestError::InvalidUrl(format!("{}: {e}", self.api_url)))?;
        url.path_segments_mut()
            .map_err(|_| RequestError::InvalidUrl(self.api_url.clone()))?
            .pop_if_empty()
            .extend(["brief", job_id, "status"]);
        Ok(url)
    }

    // ---- private helpers ----

    /// Message for a failed submission: the body's `detail` when it has
    /// one, otherwise `HTTP <status>`.
    async fn detail_error(response: reqwest::Response) -> RequestError {
        let status = response.status().as_u16();
        let detail = response
            .bytes()
            .await
            .ok()
            .and_then(|body| serde_json::from_slice::<serde_json::Value>(&body).ok())
            .and_then(|body| match body.get("detail") {
                Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(v) if briefcast_core::job::is_present(v) => Some(v.to_string()),
                _ => None,
            });

        RequestError::Api {
            status,
            message: detail.unwrap_or_else(|| format!("HTTP {status}")),
        }
    }

    /// Error for a failed status lookup. The body is not inspected.
    fn status_error(response: &reqwest::Response) -> RequestError {
        let status = response.status().as_u16();
        RequestError::Api {
            status,
            message: format!("HTTP {status}"),
        }
    }

    /// Decode a successful JSON response body into the expected type.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RequestError> {
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| RequestError::Decode(e.to_string()))
    }
}

#[async_trait]
impl BriefApi for BriefApiClient {
    async fn submit(&self, request: &BriefRequest) -> Result<SubmitResponse, RequestError> {
        tracing::debug!(api_url = %self.api_url, platforms = ?request.platforms, "Submitting brief");

        let response = self
            .client
            .post(format!("{}/brief", self.api_url))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::detail_error(response).await);
        }
        Self::decode(response).await
    }

    async fn fetch_status(&self, job_id: &str) -> Result<StatusResponse, RequestError> {
        let response = self
            .client
            .get(self.status_url(job_id)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(&response));
        }
        Self::decode(response).await
    }

    async fn health(&self) -> Result<HealthStatus, RequestError> {
        let response = self
            .client
            .get(format!("{}/health", self.api_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(&response));
        }
        Self::decode(response).await
    }
}
