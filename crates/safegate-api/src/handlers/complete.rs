//! The gateway endpoint: prompt in, decision out.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use safegate_core::{AuditFindings, BlockReason, GatewayDecision, GatewayOutcome, Stage};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    pub prompt: String,
}

/// Both allowed and blocked outcomes are 200s: a block is a decision, not
/// an error. Only a model-backend failure maps to an error status (502).
#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    pub decision: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<BlockReason>,
    pub audit: AuditFindings,
}

impl From<GatewayOutcome> for CompleteResponse {
    fn from(outcome: GatewayOutcome) -> Self {
        match outcome.decision {
            GatewayDecision::Allowed { response } => Self {
                decision: "allowed",
                response_text: Some(response),
                block_stage: None,
                block_reason: None,
                audit: outcome.audit,
            },
            GatewayDecision::Blocked { stage, reason } => Self {
                decision: "blocked",
                response_text: None,
                block_stage: Some(stage),
                block_reason: Some(reason),
                audit: outcome.audit,
            },
        }
    }
}

/// POST /v1/gateway/complete
pub async fn complete(
    State(state): State<AppState>,
    Json(request): Json<CompleteRequest>,
) -> Response {
    let tag = format!("request::{}", Uuid::new_v4());

    match state
        .gateway
        .handle_tagged(&request.prompt, &tag, state.model.as_ref())
        .await
    {
        Ok(outcome) => (StatusCode::OK, Json(CompleteResponse::from(outcome))).into_response(),
        Err(e) => {
            tracing::error!(%tag, error = %e, "request failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": "model invocation failed",
                    "message": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}
