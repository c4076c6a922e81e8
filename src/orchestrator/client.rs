//! HTTP orchestrator client
//!
//! JSON client for the build orchestrator API, with the same bounded
//! retry policy as the repository client and a semver compatibility check
//! against the server's advertised API version. Submission is the one
//! exception: a submit request is never retried, because a transport
//! error does not prove the server discarded the job and a blind retry
//! could schedule it twice.

use std::time::Duration;

use semver::{Version as ApiVersion, VersionReq};
use serde::Deserialize;

use crate::config::defaults;
use crate::core::job::Job;
use crate::error::OrchestratorError;

use super::{JobHandle, JobRequest, JobStatus, Orchestrator};

/// API versions this client can talk to
pub const SUPPORTED_API: &str = "^1";

/// HTTP client for the build orchestrator
#[derive(Debug, Clone)]
pub struct HttpOrchestrator {
    /// HTTP client
    client: reqwest::Client,
    /// Orchestrator base URL
    base_url: String,
    /// Maximum retry attempts
    max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds)
    base_delay_ms: u64,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

impl HttpOrchestrator {
    /// Create a client for an orchestrator base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_config(
            base_url,
            defaults::MAX_REQUEST_RETRIES,
            defaults::RETRY_BASE_DELAY_MS,
        )
    }

    /// Create a client with custom retry settings
    pub fn with_config(base_url: impl Into<String>, max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS))
                .connect_timeout(Duration::from_secs(defaults::CONNECT_TIMEOUT_SECS))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_retries,
            base_delay_ms,
        }
    }

    /// Orchestrator base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Verify the server's API version satisfies [`SUPPORTED_API`]
    pub async fn check_api_version(&self) -> Result<(), OrchestratorError> {
        let url = format!("{}/api/version", self.base_url);
        let response: VersionResponse = self.get_json(&url).await?;

        let server =
            ApiVersion::parse(&response.version).map_err(|e| OrchestratorError::Protocol {
                message: format!("bad API version '{}': {e}", response.version),
            })?;
        let supported = VersionReq::parse(SUPPORTED_API).expect("supported range is valid");

        if supported.matches(&server) {
            Ok(())
        } else {
            Err(OrchestratorError::ApiVersionMismatch {
                server: response.version,
                supported: SUPPORTED_API.to_string(),
            })
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
    ) -> Result<T, OrchestratorError> {
        let mut attempts = 0;
        let mut delay_ms = self.base_delay_ms;
        let mut last_error = None;

        while attempts < self.max_retries {
            attempts += 1;
            match self.request_once(self.client.get(url), url).await {
                Ok(value) => return Ok(value),
                Err(error @ OrchestratorError::Network { .. }) => {
                    last_error = Some(error);
                    if attempts < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        delay_ms = (delay_ms * 2).min(30_000);
                    }
                }
                Err(error) => return Err(error),
            }
        }

        Err(last_error.unwrap_or(OrchestratorError::Network {
            url: url.to_string(),
            error: "retries exhausted".to_string(),
        }))
    }

    /// POST a JSON body with bounded retry on transport failures
    async fn post_json<B: serde::Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, OrchestratorError> {
        let url = format!("{}{path}", self.base_url);
        let mut attempts = 0;
        let mut delay_ms = self.base_delay_ms;
        let mut last_error = None;

        while attempts < self.max_retries {
            attempts += 1;
            match self
                .request_once(self.client.post(&url).json(body), &url)
                .await
            {
                Ok(value) => return Ok(value),
                Err(error @ OrchestratorError::Network { .. }) => {
                    last_error = Some(error);
                    if attempts < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        delay_ms = (delay_ms * 2).min(30_000);
                    }
                }
                Err(error) => return Err(error),
            }
        }

        Err(last_error.unwrap_or(OrchestratorError::Network {
            url,
            error: "retries exhausted".to_string(),
        }))
    }

    /// POST a JSON body exactly once, transport errors included
    async fn post_json_once<B: serde::Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, OrchestratorError> {
        let url = format!("{}{path}", self.base_url);
        self.request_once(self.client.post(&url).json(body), &url)
            .await
    }

    async fn request_once<T: for<'de> Deserialize<'de>>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<T, OrchestratorError> {
        let response = request.send().await.map_err(|e| OrchestratorError::Network {
            url: url.to_string(),
            error: e.to_string(),
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            if let Some(id) = job_id_from_url(url) {
                return Err(OrchestratorError::JobNotFound { job_id: id });
            }
        }
        if !status.is_success() {
            return Err(OrchestratorError::Protocol {
                message: format!("{url} returned HTTP {status}"),
            });
        }

        response
            .json()
            .await
            .map_err(|e| OrchestratorError::Protocol {
                message: e.to_string(),
            })
    }
}

fn job_id_from_url(url: &str) -> Option<u64> {
    url.rsplit('/').next()?.parse().ok()
}

impl Orchestrator for HttpOrchestrator {
    async fn create_job(&self, request: &JobRequest) -> Result<Job, OrchestratorError> {
        self.post_json("/api/jobs/compose", request).await
    }

    async fn submit(&self, job: &Job) -> Result<JobHandle, OrchestratorError> {
        // A failed submit is never retried: the transport error does not
        // prove the server discarded the job, and a second attempt could
        // schedule it twice.
        self.post_json_once("/api/jobs", job).await
    }

    async fn job_status(&self, job_id: u64) -> Result<JobStatus, OrchestratorError> {
        let url = format!("{}/api/jobs/{job_id}", self.base_url);
        self.get_json(&url).await
    }
}
