//! HTTP client for the InternSight backend.
//!
//! Thin reqwest wrapper with Bearer auth and two timeout classes: the
//! client-wide 10 s timeout for lightweight calls and a per-request 60 s
//! timeout for the multipart report upload. The `ReportApi` trait is the
//! seam the submission pipeline is tested against.

pub mod api;

use internsight_core::{PipelineConfig, ReportError};
use reqwest::Client;
use std::time::Duration;

pub use api::ReportApi;

/// HTTP client for the InternSight API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    upload_timeout: Duration,
}

impl ApiClient {
    pub fn new(
        base_url: String,
        metadata_timeout: Duration,
        upload_timeout: Duration,
    ) -> Result<Self, ReportError> {
        let client = Client::builder()
            .timeout(metadata_timeout)
            .build()
            .map_err(|e| ReportError::Unexpected(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            upload_timeout,
        })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, ReportError> {
        Self::new(
            config.base_url.clone(),
            config.metadata_timeout,
            config.upload_timeout,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn upload_timeout(&self) -> Duration {
        self.upload_timeout
    }
}

/// A request that never reached the server is a connectivity failure; the
/// session is preserved and the user may retry.
pub(crate) fn transport_error(err: reqwest::Error) -> ReportError {
    if err.is_timeout() {
        ReportError::Connectivity(format!("Request timed out: {}", err))
    } else {
        ReportError::Connectivity(err.to_string())
    }
}

/// Turn a non-2xx response into a `Server` error carrying the backend's
/// `message` field verbatim when one is present.
pub(crate) async fn server_error(response: reqwest::Response) -> ReportError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => ReportError::Server(parsed.message),
        Err(_) if !body.is_empty() => ReportError::Server(body),
        Err(_) => ReportError::Server(format!("Server returned status {}", status)),
    }
}
