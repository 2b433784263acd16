//! Analysis result model and wire-format decoding.
//!
//! The analysis service returns a JSON object with a single `analysis` key
//! holding an array of finding objects. Each finding carries a `type`
//! discriminator: `"score"` for numeric risk scores, anything else (e.g.
//! `"PII"`) for extraction results. Score findings gate the request;
//! extraction findings are informational and flow into the audit channel.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One signal from a single analysis call.
///
/// Ordering among findings is irrelevant and names are not unique: a PII
/// extraction can appear once per detected entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisFinding {
    /// A numeric risk score for a named category (e.g. "toxicity").
    Score {
        /// Category name, matched against the threshold table.
        category: String,
        /// Score in `[0, 1]`, higher is riskier.
        score: f64,
    },
    /// An extraction result, e.g. a detected PII span. Never affects the
    /// verdict.
    Entity {
        /// The wire `type` string (e.g. "PII"), or the item's `name` when
        /// one is present.
        name: String,
        /// The raw extraction payload, passed through uninterpreted.
        value: Value,
    },
}

impl AnalysisFinding {
    /// Returns true for informational (non-gating) findings.
    pub fn is_entity(&self) -> bool {
        matches!(self, AnalysisFinding::Entity { .. })
    }
}

/// Why an analysis call produced no findings.
///
/// The three causes are equivalent for gating (all feed the fail-safe
/// policy) but are kept distinct for logs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FailureCause {
    /// Connect/read timeout, refused connection, or any other transport error.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-2xx status.
    #[error("analysis service returned status {0}")]
    Protocol(u16),

    /// The 2xx response body could not be decoded.
    #[error("malformed analysis payload: {0}")]
    Decode(String),
}

/// Outcome of one call to the analysis service.
///
/// Immutable once constructed and owned by the caller that requested it.
/// The enum makes the core invariant structural: a failure can never carry
/// findings, and a success always carries a (possibly empty) sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    /// The service answered 2xx with a decodable body.
    Success(Vec<AnalysisFinding>),
    /// The call failed; the cause is preserved for logging only.
    Failure(FailureCause),
}

impl AnalysisResult {
    /// Findings from a successful analysis; empty for failures.
    pub fn findings(&self) -> &[AnalysisFinding] {
        match self {
            AnalysisResult::Success(findings) => findings,
            AnalysisResult::Failure(_) => &[],
        }
    }

    /// True when the analysis call did not complete.
    pub fn is_failure(&self) -> bool {
        matches!(self, AnalysisResult::Failure(_))
    }

    /// The informational findings, for the audit side channel.
    pub fn entity_findings(&self) -> Vec<AnalysisFinding> {
        self.findings()
            .iter()
            .filter(|f| f.is_entity())
            .cloned()
            .collect()
    }
}

#[derive(Deserialize)]
struct WireEnvelope {
    analysis: Vec<WireFinding>,
}

#[derive(Deserialize)]
struct WireFinding {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    result: Value,
}

/// Decode a 2xx response body into findings.
///
/// A score finding without a name or with a non-numeric result is a
/// [`FailureCause::Decode`], same as an undecodable envelope: the caller
/// cannot evaluate a score it cannot read, so the whole analysis is
/// treated as failed rather than partially applied.
pub fn decode_analysis_body(body: &[u8]) -> Result<Vec<AnalysisFinding>, FailureCause> {
    let envelope: WireEnvelope =
        serde_json::from_slice(body).map_err(|e| FailureCause::Decode(e.to_string()))?;

    envelope
        .analysis
        .into_iter()
        .map(|item| {
            if item.kind == "score" {
                let category = item
                    .name
                    .ok_or_else(|| FailureCause::Decode("score finding without a name".into()))?;
                let score = item.result.as_f64().ok_or_else(|| {
                    FailureCause::Decode(format!("non-numeric score for {category:?}"))
                })?;
                Ok(AnalysisFinding::Score { category, score })
            } else {
                Ok(AnalysisFinding::Entity {
                    name: item.name.unwrap_or(item.kind),
                    value: item.result,
                })
            }
        })
        .collect()
}
