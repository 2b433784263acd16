//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use safegate_core::{AnalysisClient, Gateway, GatewayError, ModelInvoker};

use crate::model::HttpModel;
use crate::settings::Settings;

/// Everything a request handler needs. Cheap to clone; the gateway itself
/// is immutable and shared.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub model: Arc<dyn ModelInvoker>,
}

impl AppState {
    /// Wire up the gateway and model backend from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, GatewayError> {
        let client = AnalysisClient::with_timeouts(
            settings.analyzer.base_url.clone(),
            Duration::from_millis(settings.analyzer.connect_timeout_ms),
            Duration::from_millis(settings.analyzer.read_timeout_ms),
        )?;

        let gateway = Gateway::builder()
            .with_analyzer(Box::new(client))
            .with_thresholds(settings.thresholds.clone())
            .with_fail_safe(settings.fail_safe)
            .with_retry(settings.retry)
            .with_analysis_id(settings.analyzer.analysis_id)
            .with_tag(settings.analyzer.tag.clone())
            .with_credential(settings.analyzer.api_key.clone())
            .build()?;

        let model = HttpModel::new(settings.model.url.clone(), settings.model.api_key.clone());

        Ok(Self {
            gateway: Arc::new(gateway),
            model: Arc::new(model),
        })
    }
}
