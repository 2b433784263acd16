//! HTTP-backed model collaborator.

use async_trait::async_trait;
use safegate_core::{GatewayError, ModelInvoker};

/// Posts the prompt to a completion endpoint and returns the response body
/// as the model's reply. The backend contract is text in, text out; any
/// transport error or non-2xx status is fatal for the request.
pub struct HttpModel {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpModel {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl ModelInvoker for HttpModel {
    async fn invoke(&self, prompt: &str) -> Result<String, GatewayError> {
        let mut request = self.http.post(&self.url).body(prompt.to_string());
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Model(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Model(format!(
                "model backend returned status {status}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| GatewayError::Model(e.to_string()))
    }
}
