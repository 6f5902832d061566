use std::path::Path;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

use crate::handlers::{agent_health, agent_query, health, proxy_query};
use crate::payment::require_payment;
use crate::state::{AgentState, ProxyState};

/// Routes of the Request Proxy Service. Anything that is not an API route is
/// served from `public_dir`, falling back to its `index.html`.
pub fn create_proxy_routes(state: ProxyState, public_dir: &Path) -> Router {
    let static_files = ServeDir::new(public_dir)
        .fallback(ServeFile::new(public_dir.join("index.html")));

    Router::new()
        .route("/health", get(health))
        .route("/api/grok", post(proxy_query))
        .fallback_service(static_files)
        .with_state(state)
}

/// Routes of one Per-Agent Query Service. Only `/query` sits behind the
/// payment gate.
pub fn create_agent_routes(state: AgentState) -> Router {
    let gated = Router::new()
        .route("/query", post(agent_query))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_payment));

    Router::new()
        .route("/health", get(agent_health))
        .merge(gated)
        .with_state(state)
}
