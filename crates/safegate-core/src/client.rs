//! HTTP client for the external content-analysis service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;

use crate::analysis::{decode_analysis_body, AnalysisResult, FailureCause};
use crate::error::GatewayError;

/// Connect timeout: fail fast instead of stalling a user-facing call.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);
/// Read timeout for the full request.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Anything that can analyze a piece of text.
///
/// The seam the pipeline and tests plug stubs into; the production
/// implementation is [`AnalysisClient`].
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyze `text` under the analyzer configuration `analysis_id`.
    ///
    /// `tag` is an opaque correlation label forwarded for downstream
    /// auditing; `credential` authorizes the call. Infallible by contract:
    /// every failure mode is folded into [`AnalysisResult::Failure`].
    async fn analyze(
        &self,
        text: &str,
        analysis_id: u64,
        tag: &str,
        credential: &str,
    ) -> AnalysisResult;
}

/// Client for the analysis wire contract:
/// `POST {base_url}/v1/analysis/{id}?tag={tag}` with a raw-text body and a
/// bearer credential.
///
/// One outbound request per call, no retries (retries are the pipeline's
/// policy decision, not the client's).
pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnalysisClient {
    /// Client with the default sub-second connect / 5 s read timeouts.
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        Self::with_timeouts(base_url, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT)
    }

    /// Client with explicit timeouts. `connect` should stay well below
    /// `read` so unreachable analyzers fail fast.
    pub fn with_timeouts(
        base_url: impl Into<String>,
        connect: Duration,
        read: Duration,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect)
            .timeout(read)
            .build()
            .map_err(|e| GatewayError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Analyzer for AnalysisClient {
    async fn analyze(
        &self,
        text: &str,
        analysis_id: u64,
        tag: &str,
        credential: &str,
    ) -> AnalysisResult {
        let url = format!("{}/v1/analysis/{}", self.base_url, analysis_id);

        let response = self
            .http
            .post(&url)
            .query(&[("tag", tag)])
            .header(AUTHORIZATION, format!("Bearer {credential}"))
            .body(text.to_string())
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(analysis_id, tag, error = %e, "analysis request failed");
                return AnalysisResult::Failure(FailureCause::Network(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::error!(analysis_id, tag, status = status.as_u16(), "analysis service rejected request");
            return AnalysisResult::Failure(FailureCause::Protocol(status.as_u16()));
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(analysis_id, tag, error = %e, "analysis response body unreadable");
                return AnalysisResult::Failure(FailureCause::Network(e.to_string()));
            }
        };

        match decode_analysis_body(&body) {
            Ok(findings) => {
                tracing::debug!(analysis_id, tag, findings = findings.len(), "analysis complete");
                AnalysisResult::Success(findings)
            }
            Err(cause) => {
                tracing::error!(analysis_id, tag, %cause, "analysis response undecodable");
                AnalysisResult::Failure(cause)
            }
        }
    }
}
