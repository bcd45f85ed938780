//! Remote scoring client: the only module that talks to the job-board backend
//! for recommendations, ranked applications and score recalculation.
//!
//! Pure I/O boundary. No caching and no retries here; both belong to
//! `matching::service`.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(test)]
pub mod fakes;

const RECOMMENDATIONS_PATH: [&str; 2] = ["recommandations", "candidat"];
const APPLICATIONS_PATH: &str = "applications";
const RECALCULATE_PATH: [&str; 2] = ["applications", "recalculate-scores"];

#[derive(Debug, Error)]
pub enum ScoringError {
    /// Transport failure or timeout. The only retryable kind.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authorization error: {message}")]
    Authorization { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Remote error (status {status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Malformed response body: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ScoringError {
    /// Maps a non-2xx backend status to its error kind.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => ScoringError::Validation { message },
            401 | 403 => ScoringError::Authorization { message },
            404 => ScoringError::NotFound { message },
            _ => ScoringError::Remote { status, message },
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ScoringError::Validation {
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ScoringError::Network(_))
    }
}

/// The seam between the recommendation facade and the backend.
///
/// Records come back as raw JSON values so the caller can drop malformed
/// entries one by one instead of failing the whole response.
#[async_trait]
pub trait ScoringBackend: Send + Sync {
    async fn fetch_top_recommendations(
        &self,
        subject_id: &str,
        limit: u32,
    ) -> Result<Vec<Value>, ScoringError>;

    async fn fetch_all_recommendations(&self, subject_id: &str) -> Result<Vec<Value>, ScoringError>;

    async fn fetch_ranked_applications(&self, job_id: &str) -> Result<Vec<Value>, ScoringError>;

    /// Fire-and-forget trigger; the backend recomputes asynchronously.
    async fn request_recalculation(&self) -> Result<(), ScoringError>;
}

#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    message: Option<String>,
}

/// reqwest-backed implementation of [`ScoringBackend`].
#[derive(Clone)]
pub struct RemoteScoringClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl RemoteScoringClient {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ScoringError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = Url::parse(base_url).map_err(|e| {
            ScoringError::validation(format!("invalid scoring API URL {base_url}: {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ScoringError::validation(format!(
                "scoring API URL {base_url} cannot carry a path"
            )));
        }

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Appends `segments` to the base URL. Each segment is percent-encoded as a
    /// whole, so ids containing `/`, `?` or `#` stay inside their own segment.
    fn url(&self, segments: &[&str]) -> Result<Url, ScoringError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(ScoringError::validation(format!("invalid path segment {bad:?}")));
        }

        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_records(&self, segments: &[&str]) -> Result<Vec<Value>, ScoringError> {
        let url = self.url(segments)?;
        debug!("GET {url}");

        let response = self.authorize(self.client.get(url.clone())).send().await?;
        let body = read_success_body(response).await?;

        let records: Vec<Value> = serde_json::from_str(&body)?;
        debug!("GET {url} returned {} records", records.len());
        Ok(records)
    }
}

#[async_trait]
impl ScoringBackend for RemoteScoringClient {
    async fn fetch_top_recommendations(
        &self,
        subject_id: &str,
        limit: u32,
    ) -> Result<Vec<Value>, ScoringError> {
        let [root, scope] = RECOMMENDATIONS_PATH;
        let limit = limit.to_string();
        self.get_records(&[root, scope, subject_id, "top", &limit])
            .await
    }

    async fn fetch_all_recommendations(&self, subject_id: &str) -> Result<Vec<Value>, ScoringError> {
        let [root, scope] = RECOMMENDATIONS_PATH;
        self.get_records(&[root, scope, subject_id]).await
    }

    async fn fetch_ranked_applications(&self, job_id: &str) -> Result<Vec<Value>, ScoringError> {
        self.get_records(&[APPLICATIONS_PATH, "job", job_id, "sorted"])
            .await
    }

    async fn request_recalculation(&self) -> Result<(), ScoringError> {
        let url = self.url(&RECALCULATE_PATH)?;
        debug!("POST {url}");

        let response = self.authorize(self.client.post(url.clone())).send().await?;
        // Body is a plain-text confirmation; nothing to decode.
        read_success_body(response).await?;
        Ok(())
    }
}

/// Returns the body of a 2xx response, or the mapped error for anything else.
/// Prefers the backend's `{"message": ...}` field, then the raw body, then the
/// status reason.
async fn read_success_body(response: Response) -> Result<String, ScoringError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return Ok(body);
    }

    let message = serde_json::from_str::<BackendErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    warn!("Scoring backend returned {}: {}", status, message);
    Err(ScoringError::from_status(status.as_u16(), message))
}
