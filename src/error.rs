use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const UPSTREAM_AUTH_MESSAGE: &str =
    "Authentication with the completion API failed. Check the configured API key.";
pub const UPSTREAM_NOT_FOUND_MESSAGE: &str = "Completion API endpoint or model not found.";
pub const AGENT_FAILURE_MESSAGE: &str = "Agent execution failed due to internal error.";

/// Failures of a single proxy or agent request
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required request field is missing or the body is malformed
    #[error("{0}")]
    BadRequest(String),

    /// A required credential is not configured
    #[error("{0}")]
    Configuration(String),

    #[error("{}", UPSTREAM_AUTH_MESSAGE)]
    UpstreamAuth,

    #[error("{}", UPSTREAM_NOT_FOUND_MESSAGE)]
    UpstreamNotFound,

    /// Any other non-success status from the completion API
    #[error("{message}")]
    UpstreamOther { status: u16, message: String },

    /// Transport failures, undecodable replies and everything else
    #[error("Completion API call failed: {0}")]
    InternalUnexpected(String),
}

impl ServiceError {
    /// Classify a non-success completion API reply.
    pub fn from_upstream(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => Self::UpstreamAuth,
            404 => Self::UpstreamNotFound,
            _ => Self::UpstreamOther {
                status,
                message: upstream_error_message(body).unwrap_or_else(|| {
                    format!("Completion API request failed with status {}.", status)
                }),
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Bind this error to the presentation policy of the service returning it.
    pub fn present(self, policy: ErrorPolicy) -> PresentedError {
        PresentedError {
            policy,
            error: self,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        Self::InternalUnexpected(err.to_string())
    }
}

/// Pull a human readable message out of an upstream error body.
///
/// Accepts `{"error": {"message": ..}}`, `{"error": ".."}` and
/// `{"message": ".."}`.
fn upstream_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = value
        .pointer("/error/message")
        .or_else(|| value.get("error").filter(|e| e.is_string()))
        .or_else(|| value.get("message"))?
        .as_str()?;

    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}

/// How a service exposes failures to its callers.
///
/// The proxy reports every upstream failure category in detail. The agent
/// service never leaks upstream detail and collapses everything except input
/// validation into one generic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    Detailed,
    Generic,
}

impl ErrorPolicy {
    pub fn render(self, error: &ServiceError) -> (StatusCode, ErrorBody) {
        let message = match (self, error) {
            (_, ServiceError::BadRequest(msg)) => msg.clone(),
            (Self::Detailed, other) => other.to_string(),
            (Self::Generic, _) => AGENT_FAILURE_MESSAGE.to_string(),
        };
        (error.status_code(), ErrorBody { error: message })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A `ServiceError` paired with the policy used to render it
#[derive(Debug)]
pub struct PresentedError {
    pub policy: ErrorPolicy,
    pub error: ServiceError,
}

impl IntoResponse for PresentedError {
    fn into_response(self) -> Response {
        let (status, body) = self.policy.render(&self.error);
        (status, Json(body)).into_response()
    }
}
