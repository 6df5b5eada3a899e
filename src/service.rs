//! HTTP client for the geometry service.
//!
//! `POST {base}/preview` returns pillar and hole positions as JSON;
//! `POST {base}/generate` returns the finished STL with timing and size
//! metadata in response headers. Both take the same [`ApiParameters`] body.

use std::time::Duration;

use reqwest::header::HeaderMap;

use crate::constants;
use crate::error::ServiceError;
use crate::types::{ApiParameters, PreviewGeometry};

/// Header carrying the server-side generation time in seconds.
pub const GENERATION_TIME_HEADER: &str = "X-Generation-Time";
/// Header carrying a human-readable size of the generated part.
pub const DIMENSIONS_HEADER: &str = "X-Dimensions";

/// A generated STL file and its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Raw STL bytes
    pub bytes: Vec<u8>,
    /// Generation time reported by the service
    pub generation_time: Option<String>,
    /// Dimensions reported by the service
    pub dimensions: Option<String>,
}

impl Artifact {
    /// Status text shown once the artifact is saved.
    pub fn summary(&self) -> String {
        format!(
            "Generated in {}s ({})",
            self.generation_time.as_deref().unwrap_or("?"),
            self.dimensions.as_deref().unwrap_or("unknown size")
        )
    }
}

/// Client bound to one service base URL.
#[derive(Debug, Clone)]
pub struct PreviewService {
    client: reqwest::Client,
    base_url: String,
    preview_timeout: Duration,
    generate_timeout: Duration,
}

impl PreviewService {
    /// Creates a client for `base_url` (no trailing slash) with the default
    /// request timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            preview_timeout: Duration::from_secs_f64(constants::PREVIEW_TIMEOUT_SECS),
            generate_timeout: Duration::from_secs_f64(constants::GENERATE_TIMEOUT_SECS),
        }
    }

    /// Replaces the deadlines after which preview and generation requests
    /// fail with [`ServiceError::Timeout`].
    pub fn with_timeouts(mut self, preview: Duration, generate: Duration) -> Self {
        self.preview_timeout = preview;
        self.generate_timeout = generate;
        self
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post(
        &self,
        path: &str,
        params: &ApiParameters,
        timeout: Duration,
    ) -> Result<reqwest::Response, ServiceError> {
        params.validate()?;
        // Covers connecting, the status line and reading the body.
        let response = self
            .client
            .post(self.endpoint(path))
            .timeout(timeout)
            .json(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }
        Ok(response)
    }

    /// Requests pillar and hole positions for `params`.
    ///
    /// Malformed parameters are rejected before anything is sent.
    pub async fn fetch_preview(&self, params: &ApiParameters) -> Result<PreviewGeometry, ServiceError> {
        let response = self.post("preview", params, self.preview_timeout).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::Decode(e.to_string()))
    }

    /// Requests the full STL for `params`.
    pub async fn generate_artifact(&self, params: &ApiParameters) -> Result<Artifact, ServiceError> {
        let response = self.post("generate", params, self.generate_timeout).await?;
        let generation_time = header_text(response.headers(), GENERATION_TIME_HEADER);
        let dimensions = header_text(response.headers(), DIMENSIONS_HEADER);
        let bytes = response.bytes().await?.to_vec();
        log::info!("Received {} byte artifact", bytes.len());
        Ok(Artifact {
            bytes,
            generation_time,
            dimensions,
        })
    }
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
}
