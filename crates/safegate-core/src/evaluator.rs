//! Pure verdict computation over analysis results.

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisFinding, AnalysisResult};
use crate::thresholds::ThresholdTable;

/// What to do when the analyzer could not be consulted.
///
/// This is an explicit deployment choice, applied identically to the
/// inbound and outbound stages of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailSafePolicy {
    /// Treat an analyzer failure as `Safe`: availability over safety.
    FailOpen,
    /// Treat an analyzer failure as `Unsafe`: text the gateway cannot
    /// analyze does not pass.
    FailClosed,
}

impl Default for FailSafePolicy {
    fn default() -> Self {
        FailSafePolicy::FailClosed
    }
}

/// Outcome of evaluating one analysis result. Derived, never stored.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Safe,
    /// Unsafe, carrying the score findings that tripped their thresholds.
    /// Empty when the verdict comes from fail-closed on an analyzer failure.
    Unsafe(Vec<AnalysisFinding>),
}

impl Verdict {
    pub fn is_safe(&self) -> bool {
        matches!(self, Verdict::Safe)
    }
}

/// Converts an [`AnalysisResult`] into a [`Verdict`] against a threshold
/// table. Pure and deterministic: no I/O, no mutation.
#[derive(Debug, Clone)]
pub struct ScoreEvaluator {
    thresholds: ThresholdTable,
    fail_safe: FailSafePolicy,
}

impl ScoreEvaluator {
    pub fn new(thresholds: ThresholdTable, fail_safe: FailSafePolicy) -> Self {
        Self {
            thresholds,
            fail_safe,
        }
    }

    pub fn fail_safe(&self) -> FailSafePolicy {
        self.fail_safe
    }

    /// Evaluate one analysis result.
    ///
    /// Failures resolve through the fail-safe policy. Successes trip on any
    /// score finding with `score >= resolve(category)`; entity findings are
    /// ignored regardless of content.
    pub fn evaluate(&self, result: &AnalysisResult) -> Verdict {
        match result {
            AnalysisResult::Failure(_) => match self.fail_safe {
                FailSafePolicy::FailOpen => Verdict::Safe,
                FailSafePolicy::FailClosed => Verdict::Unsafe(Vec::new()),
            },
            AnalysisResult::Success(findings) => {
                let tripped: Vec<AnalysisFinding> = findings
                    .iter()
                    .filter(|finding| match finding {
                        AnalysisFinding::Score { category, score } => {
                            *score >= self.thresholds.resolve(category)
                        }
                        AnalysisFinding::Entity { .. } => false,
                    })
                    .cloned()
                    .collect();

                if tripped.is_empty() {
                    Verdict::Safe
                } else {
                    Verdict::Unsafe(tripped)
                }
            }
        }
    }
}
