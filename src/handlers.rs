use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::{ErrorPolicy, PresentedError, ServiceError};
use crate::llm::{normalize_completion, NormalizedCompletion};
use crate::prompts::{self, DEFAULT_AGENT_KIND};
use crate::state::{AgentState, ProxyState};

const LOG_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyQueryRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentQueryRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentQueryResponse {
    pub agent_id: String,
    pub agent_name: String,
    pub result: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentHealthResponse {
    pub status: String,
    pub agent_id: String,
    pub agent_name: String,
    pub timestamp: String,
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.is_empty())
}

fn preview(text: &str) -> String {
    if text.chars().count() <= LOG_PREVIEW_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
        format!("{}...", cut)
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: timestamp(),
    })
}

pub async fn agent_health(State(state): State<AgentState>) -> Json<AgentHealthResponse> {
    Json(AgentHealthResponse {
        status: "OK".to_string(),
        agent_id: state.identity.agent_id.clone(),
        agent_name: state.identity.name.clone(),
        timestamp: timestamp(),
    })
}

/// `POST /api/grok`
pub async fn proxy_query(
    State(state): State<ProxyState>,
    payload: Result<Json<ProxyQueryRequest>, JsonRejection>,
) -> Result<Json<NormalizedCompletion>, PresentedError> {
    run_proxy_query(&state, payload)
        .await
        .map(Json)
        .map_err(|e| {
            match &e {
                ServiceError::BadRequest(_) => warn!("Rejected proxy query: {}", e),
                _ => error!("Proxy query failed: {}", e),
            }
            e.present(ErrorPolicy::Detailed)
        })
}

async fn run_proxy_query(
    state: &ProxyState,
    payload: Result<Json<ProxyQueryRequest>, JsonRejection>,
) -> Result<NormalizedCompletion, ServiceError> {
    let Json(body) = payload.map_err(|e| ServiceError::BadRequest(e.body_text()))?;

    let (id, query) = match (non_empty(body.id), non_empty(body.query)) {
        (Some(id), Some(query)) => (id, query),
        _ => {
            return Err(ServiceError::BadRequest(
                "Missing required fields: id and query".to_string(),
            ))
        }
    };
    let kind = non_empty(body.kind).unwrap_or_else(|| DEFAULT_AGENT_KIND.to_string());

    let api_key = state.upstream.require_api_key()?;
    let request = prompts::proxy_request(&state.upstream.model, &id, &kind, &query);
    let reply = state
        .completions
        .create_chat_completion(api_key, &request)
        .await?;

    let normalized = normalize_completion(reply);
    info!(
        "Simulated {} Agent ({}): {}",
        id,
        kind,
        preview(&normalized.result)
    );
    Ok(normalized)
}

/// `POST /query`, only reachable once the payment gate has passed
pub async fn agent_query(
    State(state): State<AgentState>,
    payload: Result<Json<AgentQueryRequest>, JsonRejection>,
) -> Result<Json<AgentQueryResponse>, PresentedError> {
    run_agent_query(&state, payload)
        .await
        .map(|result| {
            Json(AgentQueryResponse {
                agent_id: state.identity.agent_id.clone(),
                agent_name: state.identity.name.clone(),
                result,
            })
        })
        .map_err(|e| {
            match &e {
                ServiceError::BadRequest(_) => {
                    warn!("Rejected query for agent {}: {}", state.identity.agent_id, e)
                }
                _ => error!("Agent {} query failed: {}", state.identity.agent_id, e),
            }
            e.present(ErrorPolicy::Generic)
        })
}

async fn run_agent_query(
    state: &AgentState,
    payload: Result<Json<AgentQueryRequest>, JsonRejection>,
) -> Result<String, ServiceError> {
    let Json(body) = payload.map_err(|e| ServiceError::BadRequest(e.body_text()))?;
    let query = non_empty(body.query)
        .ok_or_else(|| ServiceError::BadRequest("Query is required".to_string()))?;

    let api_key = state.upstream.require_api_key()?;
    let request = prompts::agent_request(&state.upstream.model, &state.identity, &query);
    let reply = state
        .completions
        .create_chat_completion(api_key, &request)
        .await?;

    let result = normalize_completion(reply).result;
    info!(
        "Agent {} answered: {}",
        state.identity.name,
        preview(&result)
    );
    Ok(result)
}
