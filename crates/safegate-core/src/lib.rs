//! # safegate-core
//!
//! A safety gateway that sits between a user and a generative text model.
//! Every inbound prompt and every outbound model response is sent to an
//! external content-analysis service, scored against per-category risk
//! thresholds, and either allowed through or blocked.
//!
//! ## Overview
//!
//! - [`AnalysisClient`] calls the analysis service and folds every failure
//!   mode into [`AnalysisResult::Failure`] — no error ever crosses the
//!   client boundary as an exception.
//! - [`ThresholdTable`] maps category names to inclusive `[0, 1]` risk
//!   thresholds, with a configurable default.
//! - [`ScoreEvaluator`] turns an analysis result into a [`Verdict`],
//!   resolving analyzer failures through an explicit [`FailSafePolicy`].
//! - [`Gateway`] orchestrates inbound check, single model invocation, and
//!   outbound check, returning a [`GatewayDecision`] plus audit findings.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use safegate_core::{Gateway, GatewayDecision, ModelInvoker};
//!
//! let gateway = Gateway::builder()
//!     .with_endpoint("https://analysis.example.com")
//!     .with_analysis_id(10)
//!     .with_credential(std::env::var("ANALYSIS_API_KEY")?)
//!     .build()?;
//!
//! let outcome = gateway.handle("Hello, friend", &my_model).await?;
//! match outcome.decision {
//!     GatewayDecision::Allowed { response } => println!("{response}"),
//!     GatewayDecision::Blocked { stage, .. } => println!("blocked at {stage:?}"),
//! }
//! ```

pub mod analysis;
pub mod client;
pub mod error;
pub mod evaluator;
pub mod pipeline;
pub mod thresholds;

// Primary exports
pub use analysis::{AnalysisFinding, AnalysisResult, FailureCause};
pub use client::{AnalysisClient, Analyzer};
pub use error::GatewayError;
pub use evaluator::{FailSafePolicy, ScoreEvaluator, Verdict};
pub use pipeline::{
    AuditFindings, BlockReason, Gateway, GatewayBuilder, GatewayDecision, GatewayOutcome,
    ModelInvoker, RetryPolicy, Stage,
};
pub use thresholds::ThresholdTable;
