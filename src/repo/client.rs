//! HTTP repository client
//!
//! Implements the [`Repository`] contract against the repository's JSON
//! API. Transient network failures are retried here with bounded
//! exponential backoff; the planning layer never retries.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::core::label::Label;
use crate::core::spec::{TroveSpec, TroveTup};
use crate::error::RepoError;

use super::{FindResult, Repository};

/// HTTP client for the package repository
#[derive(Debug, Clone)]
pub struct HttpRepository {
    /// HTTP client
    client: reqwest::Client,
    /// Repository base URL
    base_url: String,
    /// Maximum retry attempts
    max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds)
    base_delay_ms: u64,
}

#[derive(Debug, Serialize)]
struct FindTrovesRequest<'a> {
    specs: &'a [TroveSpec],
    search_labels: &'a [Label],
    allow_missing: bool,
}

#[derive(Debug, Deserialize)]
struct FindTrovesResponse {
    results: Vec<FindTrovesEntry>,
    #[serde(default)]
    missing: Vec<TroveSpec>,
}

#[derive(Debug, Deserialize)]
struct FindTrovesEntry {
    spec: TroveSpec,
    matches: Vec<TroveTup>,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    contents: Vec<TroveTup>,
}

impl HttpRepository {
    /// Create a client for a repository base URL
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

    /// Repository base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body with bounded retry on transport failures
    async fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RepoError> {
        let url = format!("{}{path}", self.base_url);
        let mut attempts = 0;
        let mut delay_ms = self.base_delay_ms;
        let mut last_error = None;

        while attempts < self.max_retries {
            attempts += 1;

            match self.post_json_once(&url, body).await {
                Ok(value) => return Ok(value),
                Err(error @ RepoError::Network { .. }) => {
                    last_error = Some(error);
                    if attempts < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        delay_ms = (delay_ms * 2).min(30_000);
                    }
                }
                // Protocol-level failures never heal with a retry.
                Err(error) => return Err(error),
            }
        }

        Err(last_error.unwrap_or(RepoError::MaxRetriesExceeded {
            url,
            retries: self.max_retries,
        }))
    }

    async fn post_json_once<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, RepoError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| RepoError::Network {
                url: url.to_string(),
                error: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RepoError::Protocol {
                message: format!("{url} returned HTTP {status}"),
            });
        }

        response.json().await.map_err(|e| RepoError::Protocol {
            message: e.to_string(),
        })
    }
}

impl Repository for HttpRepository {
    async fn find_troves(
        &self,
        specs: &[TroveSpec],
        search_labels: &[Label],
        allow_missing: bool,
    ) -> Result<FindResult, RepoError> {
        let request = FindTrovesRequest {
            specs,
            search_labels,
            allow_missing,
        };
        let response: FindTrovesResponse = self.post_json("/api/findTroves", &request).await?;

        let mut result = FindResult::default();
        for entry in response.results {
            result.found.insert(entry.spec, entry.matches);
        }
        for spec in response.missing {
            if !allow_missing {
                return Err(RepoError::NotFound {
                    spec: spec.to_string(),
                });
            }
            result.missing.insert(spec);
        }
        Ok(result)
    }

    async fn trove_contents(&self, trove: &TroveTup) -> Result<Vec<TroveTup>, RepoError> {
        let response: ContentsResponse = self.post_json("/api/troveContents", trove).await?;
        Ok(response.contents)
    }
}
