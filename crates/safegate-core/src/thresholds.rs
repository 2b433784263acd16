//! Per-category risk thresholds.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::GatewayError;

/// The fallback threshold used when a category has no explicit entry.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Mapping from category name to the inclusive lower bound for "unsafe".
///
/// A score trips its category when `score >= resolve(category)` — the
/// boundary is inclusive, so a score exactly at the threshold blocks.
/// Read-only after construction; requests share it without locking.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawThresholds")]
pub struct ThresholdTable {
    default: f64,
    overrides: HashMap<String, f64>,
}

impl ThresholdTable {
    /// Build a table, validating every threshold is within `[0, 1]`.
    pub fn new(default: f64, overrides: HashMap<String, f64>) -> Result<Self, GatewayError> {
        validate("default", default)?;
        for (category, value) in &overrides {
            validate(category, *value)?;
        }
        Ok(Self { default, overrides })
    }

    /// The threshold for `category`: its override if present, else the default.
    pub fn resolve(&self, category: &str) -> f64 {
        self.overrides.get(category).copied().unwrap_or(self.default)
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            default: DEFAULT_THRESHOLD,
            overrides: HashMap::new(),
        }
    }
}

fn validate(category: &str, value: f64) -> Result<(), GatewayError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(GatewayError::InvalidThreshold {
            category: category.to_string(),
            value,
        });
    }
    Ok(())
}

#[derive(Deserialize)]
struct RawThresholds {
    #[serde(default = "default_threshold")]
    default: f64,
    #[serde(default)]
    overrides: HashMap<String, f64>,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl TryFrom<RawThresholds> for ThresholdTable {
    type Error = GatewayError;

    fn try_from(raw: RawThresholds) -> Result<Self, Self::Error> {
        ThresholdTable::new(raw.default, raw.overrides)
    }
}
