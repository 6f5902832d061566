use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::info;

use super::gate::{GateDecision, X402_VERSION};
use crate::state::AgentState;

pub const PAYMENT_HEADER: &str = "x-payment";

/// Run the payment gate before the wrapped handler. A rejected request gets a
/// 402 describing what to pay and never reaches the handler.
pub async fn require_payment(
    State(state): State<AgentState>,
    request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(PAYMENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match state
        .gate
        .verify(header.as_deref(), &state.requirements)
        .await
    {
        GateDecision::Pass => next.run(request).await,
        GateDecision::Reject { reason } => {
            info!(
                "Payment rejected for agent {}: {}",
                state.identity.agent_id, reason
            );
            (
                StatusCode::PAYMENT_REQUIRED,
                Json(json!({
                    "x402Version": X402_VERSION,
                    "error": reason,
                    "accepts": [state.requirements.as_ref()],
                })),
            )
                .into_response()
        }
    }
}
