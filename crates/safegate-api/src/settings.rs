//! Layered configuration: `safegate.toml` plus `SAFEGATE_*` environment
//! overrides (e.g. `SAFEGATE_ANALYZER__API_KEY`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use safegate_core::{FailSafePolicy, RetryPolicy, ThresholdTable};

fn default_port() -> u16 {
    8080
}

fn default_tag() -> String {
    "safegate".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    500
}

fn default_read_timeout_ms() -> u64 {
    5_000
}

/// The external analysis service.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerSettings {
    /// Base URL, e.g. `https://analysis.example.com`.
    pub base_url: String,
    /// Which analyzer configuration to run.
    pub analysis_id: u64,
    /// Default correlation tag attached to analysis requests.
    #[serde(default = "default_tag")]
    pub tag: String,
    /// Bearer credential for the service.
    pub api_key: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

/// The generative model backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    /// Completion endpoint: prompt text in the body, response text back.
    pub url: String,
    /// Optional bearer credential for the backend.
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_port")]
    pub port: u16,
    pub analyzer: AnalyzerSettings,
    pub model: ModelSettings,
    #[serde(default)]
    pub thresholds: ThresholdTable,
    #[serde(default)]
    pub fail_safe: FailSafePolicy,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Settings {
    /// Load from `safegate.toml` (optional) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("safegate").required(false))
            .add_source(Environment::with_prefix("SAFEGATE").separator("__"))
            .build()?
            .try_deserialize()
    }
}
