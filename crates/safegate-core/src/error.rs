//! Gateway error types.

/// Errors that can occur while configuring or running the gateway.
///
/// Analyzer failures are deliberately NOT represented here: the analysis
/// client collapses every transport, protocol, and decode problem into
/// [`crate::AnalysisResult::Failure`] so that callers are forced to handle
/// them through the fail-safe policy rather than through error propagation.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The underlying HTTP client could not be constructed.
    #[error("failed to construct analysis client: {0}")]
    Client(String),

    /// A threshold outside `[0, 1]` was supplied.
    #[error("invalid threshold {value} for category {category:?}: must be within [0, 1]")]
    InvalidThreshold {
        /// Category the threshold was configured for (`"default"` for the fallback).
        category: String,
        /// The rejected value.
        value: f64,
    },

    /// The gateway builder was missing a required field.
    #[error("gateway configuration incomplete: {0}")]
    Config(String),

    /// The generative model collaborator failed.
    ///
    /// Fatal for the request: distinct from a policy block, which is a
    /// normal [`crate::GatewayDecision`], and distinct from analyzer
    /// failures, which are absorbed by the fail-safe policy.
    #[error("model invocation failed: {0}")]
    Model(String),
}
