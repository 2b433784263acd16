//! The gateway pipeline: inbound check, model call, outbound check.
//!
//! Every request walks the same acyclic path:
//!
//! ```text
//! InboundCheck --unsafe--> Blocked(Inbound)
//! InboundCheck --safe----> ModelCall --> OutboundCheck --unsafe--> Blocked(Outbound)
//!                                        OutboundCheck --safe----> Allowed
//! ```
//!
//! The model collaborator is invoked exactly once per request, and only
//! after the inbound verdict comes back safe: unsafe input never reaches
//! the model. Dropping the returned future cancels whichever analyzer call
//! is in flight; a request cancelled during the inbound stage leaves no
//! observable side effect.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisFinding, AnalysisResult};
use crate::client::{AnalysisClient, Analyzer};
use crate::error::GatewayError;
use crate::evaluator::{FailSafePolicy, ScoreEvaluator, Verdict};
use crate::thresholds::ThresholdTable;

const DEFAULT_TAG: &str = "safegate";

/// The generative model collaborator: text in, text out.
///
/// Supplied by the caller; the pipeline assumes nothing beyond a
/// synchronous-style full response (streaming is out of scope).
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Produce a response for `prompt`. A failure here is fatal for the
    /// request and surfaces as [`GatewayError::Model`].
    async fn invoke(&self, prompt: &str) -> Result<String, GatewayError>;
}

/// Which check a request was blocked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Inbound,
    Outbound,
}

/// Why a request was blocked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum BlockReason {
    /// One or more score findings tripped their thresholds.
    Policy {
        /// The findings that tripped.
        findings: Vec<AnalysisFinding>,
    },
    /// The analyzer could not be consulted and the gateway is fail-closed.
    AnalyzerFailure {
        /// Human-readable cause, for operators.
        detail: String,
    },
}

/// Terminal output of one request cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayDecision {
    /// Both checks passed; the model's response may be shown to the caller.
    Allowed { response: String },
    /// The request was stopped. Not an error: an expected terminal state.
    Blocked { stage: Stage, reason: BlockReason },
}

impl GatewayDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GatewayDecision::Allowed { .. })
    }
}

/// Informational findings extracted from both analyses, independent of the
/// branch taken. Outbound findings are empty when blocked at the inbound
/// stage (that analysis never ran).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditFindings {
    pub prompt: Vec<AnalysisFinding>,
    pub response: Vec<AnalysisFinding>,
}

/// Decision plus audit side channel for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayOutcome {
    pub decision: GatewayDecision,
    pub audit: AuditFindings,
}

/// Retry wrapper around analyzer calls, applied by the pipeline and never
/// hidden inside the client. Off by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure. 0 disables retries.
    #[serde(default)]
    pub max_retries: u32,
    /// Fixed delay between attempts.
    #[serde(default)]
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff_ms: 0,
        }
    }
}

/// The safety gateway.
///
/// Holds only immutable configuration after construction, so independent
/// requests run fully in parallel over a shared instance with no locking.
///
/// # Example
///
/// ```rust,ignore
/// use safegate_core::{Gateway, ModelInvoker};
///
/// let gateway = Gateway::builder()
///     .with_endpoint("https://analysis.example.com")
///     .with_analysis_id(10)
///     .with_credential(std::env::var("ANALYSIS_API_KEY")?)
///     .build()?;
///
/// let outcome = gateway.handle("Hello, friend", &my_model).await?;
/// ```
pub struct Gateway {
    analyzer: Box<dyn Analyzer>,
    evaluator: ScoreEvaluator,
    analysis_id: u64,
    tag: String,
    credential: String,
    retry: RetryPolicy,
}

impl Gateway {
    /// Start building a gateway.
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    /// Run one request through the pipeline under the configured tag.
    pub async fn handle(
        &self,
        prompt: &str,
        model: &dyn ModelInvoker,
    ) -> Result<GatewayOutcome, GatewayError> {
        self.handle_tagged(prompt, &self.tag, model).await
    }

    /// Run one request with an explicit correlation tag.
    ///
    /// Stage ordering is strict: analyze inbound, then (only on a safe
    /// verdict) invoke the model once, then analyze outbound. A block is
    /// returned as a normal [`GatewayDecision`]; only a model failure is
    /// an `Err`.
    pub async fn handle_tagged(
        &self,
        prompt: &str,
        tag: &str,
        model: &dyn ModelInvoker,
    ) -> Result<GatewayOutcome, GatewayError> {
        let inbound = self.analyze_with_retry(prompt, tag).await;
        let mut audit = AuditFindings {
            prompt: inbound.entity_findings(),
            ..AuditFindings::default()
        };

        if let Verdict::Unsafe(findings) = self.evaluator.evaluate(&inbound) {
            let reason = block_reason(&inbound, findings);
            tracing::warn!(tag, stage = "inbound", "request blocked");
            return Ok(GatewayOutcome {
                decision: GatewayDecision::Blocked {
                    stage: Stage::Inbound,
                    reason,
                },
                audit,
            });
        }

        let response = model.invoke(prompt).await?;
        tracing::debug!(tag, response_len = response.len(), "model responded");

        let outbound = self.analyze_with_retry(&response, tag).await;
        audit.response = outbound.entity_findings();

        match self.evaluator.evaluate(&outbound) {
            Verdict::Unsafe(findings) => {
                let reason = block_reason(&outbound, findings);
                tracing::warn!(tag, stage = "outbound", "response blocked");
                Ok(GatewayOutcome {
                    decision: GatewayDecision::Blocked {
                        stage: Stage::Outbound,
                        reason,
                    },
                    audit,
                })
            }
            Verdict::Safe => Ok(GatewayOutcome {
                decision: GatewayDecision::Allowed { response },
                audit,
            }),
        }
    }

    async fn analyze_with_retry(&self, text: &str, tag: &str) -> AnalysisResult {
        let mut attempt = 0;
        loop {
            let result = self
                .analyzer
                .analyze(text, self.analysis_id, tag, &self.credential)
                .await;

            match &result {
                AnalysisResult::Failure(cause) if attempt < self.retry.max_retries => {
                    attempt += 1;
                    tracing::warn!(tag, attempt, %cause, "analysis failed, retrying");
                    if self.retry.backoff_ms > 0 {
                        tokio::time::sleep(Duration::from_millis(self.retry.backoff_ms)).await;
                    }
                }
                _ => return result,
            }
        }
    }
}

fn block_reason(result: &AnalysisResult, findings: Vec<AnalysisFinding>) -> BlockReason {
    match result {
        AnalysisResult::Failure(cause) => BlockReason::AnalyzerFailure {
            detail: cause.to_string(),
        },
        AnalysisResult::Success(_) => BlockReason::Policy { findings },
    }
}

/// Builder for custom gateway configurations.
pub struct GatewayBuilder {
    analyzer: Option<Box<dyn Analyzer>>,
    endpoint: Option<String>,
    thresholds: ThresholdTable,
    fail_safe: FailSafePolicy,
    retry: RetryPolicy,
    analysis_id: Option<u64>,
    tag: String,
    credential: Option<String>,
}

impl GatewayBuilder {
    fn new() -> Self {
        Self {
            analyzer: None,
            endpoint: None,
            thresholds: ThresholdTable::default(),
            fail_safe: FailSafePolicy::default(),
            retry: RetryPolicy::default(),
            analysis_id: None,
            tag: DEFAULT_TAG.to_string(),
            credential: None,
        }
    }

    /// Use a specific analyzer implementation (stubs in tests, a
    /// pre-configured [`AnalysisClient`] in production).
    pub fn with_analyzer(mut self, analyzer: Box<dyn Analyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Base URL of the analysis service; `build` constructs an
    /// [`AnalysisClient`] with default timeouts from it. Ignored when an
    /// analyzer was set explicitly.
    pub fn with_endpoint(mut self, base_url: impl Into<String>) -> Self {
        self.endpoint = Some(base_url.into());
        self
    }

    /// Threshold table (default: 0.5 for every category).
    pub fn with_thresholds(mut self, thresholds: ThresholdTable) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Fail-safe policy (default: fail-closed).
    pub fn with_fail_safe(mut self, policy: FailSafePolicy) -> Self {
        self.fail_safe = policy;
        self
    }

    /// Retry policy for analyzer calls (default: no retries).
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Which analyzer configuration to run (required).
    pub fn with_analysis_id(mut self, analysis_id: u64) -> Self {
        self.analysis_id = Some(analysis_id);
        self
    }

    /// Default correlation tag attached to analyzer requests.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Credential for the analysis service (required).
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    /// Build the gateway.
    pub fn build(self) -> Result<Gateway, GatewayError> {
        let analyzer: Box<dyn Analyzer> = match (self.analyzer, self.endpoint) {
            (Some(analyzer), _) => analyzer,
            (None, Some(endpoint)) => Box::new(AnalysisClient::new(endpoint)?),
            (None, None) => {
                return Err(GatewayError::Config(
                    "an analyzer or an endpoint is required".to_string(),
                ))
            }
        };
        let analysis_id = self
            .analysis_id
            .ok_or_else(|| GatewayError::Config("analysis_id is required".to_string()))?;
        let credential = self
            .credential
            .ok_or_else(|| GatewayError::Config("credential is required".to_string()))?;

        Ok(Gateway {
            analyzer,
            evaluator: ScoreEvaluator::new(self.thresholds, self.fail_safe),
            analysis_id,
            tag: self.tag,
            credential,
            retry: self.retry,
        })
    }
}
