//! Client library tests against services running on loopback ports.

mod common;

use std::path::Path;
use std::time::Duration;

use axum::{
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use common::{serve, serve_on, upstream, StaticGate, StubCompletions};
use swarm_backend::client::{
    ClientConfig, ClientError, DiagramRenderer, LedgerClient, SwarmClient,
};
use swarm_backend::config::AgentIdentity;
use swarm_backend::derive_agent_port;
use swarm_backend::routes::{create_agent_routes, create_proxy_routes};
use swarm_backend::state::{AgentState, ProxyState};

fn client_for(proxy_url: String, agent_base_port: u16) -> SwarmClient {
    SwarmClient::new(ClientConfig {
        proxy_url,
        agent_host: "http://127.0.0.1".to_string(),
        agent_base_port,
        timeout: Some(Duration::from_secs(5)),
    })
    .unwrap()
}

async fn spawn_proxy(api_key: Option<&str>) -> String {
    let state = ProxyState::with_client(upstream(api_key), StubCompletions::answering("> done"));
    let addr = serve(create_proxy_routes(state, Path::new("no-public-dir"))).await;
    format!("http://{}", addr)
}

/// Start an agent service whose derived port is the port it actually binds.
/// The agent id ends in "0000", so the base port equals the bound port.
async fn spawn_agent(gate: std::sync::Arc<StaticGate>) -> (String, u16) {
    let agent_id = "scout-0000".to_string();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let bound = listener.local_addr().unwrap().port();

    let identity = AgentIdentity {
        agent_id: agent_id.clone(),
        name: "Scout".to_string(),
        ..AgentIdentity::default()
    };
    let state = AgentState::with_parts(
        identity,
        upstream(Some("xai-key")),
        StubCompletions::answering("> ANSWER: 42"),
        gate,
        "solana-devnet",
    );
    serve_on(listener, create_agent_routes(state)).await;
    (agent_id, bound)
}

#[tokio::test]
async fn health_round_trip() {
    let client = client_for(spawn_proxy(Some("k")).await, 4021);
    let health = client.health().await.unwrap();
    assert_eq!(health.status, "OK");
}

#[tokio::test]
async fn query_proxy_returns_result() {
    let client = client_for(spawn_proxy(Some("k")).await, 4021);
    let reply = client
        .query_proxy("RL-Agent-0007", "market-maker", "rebalance")
        .await
        .unwrap();
    assert_eq!(reply.result, "> done");
}

#[tokio::test]
async fn non_success_status_is_an_api_error() {
    let client = client_for(spawn_proxy(None).await, 4021);
    let err = client
        .query_proxy("RL-Agent-0007", "market-maker", "rebalance")
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("key not configured"));
        }
        other => panic!("expected an API error, got {:?}", other),
    }

    let err = client.query_proxy("", "x", "q").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn query_agent_uses_derived_port() {
    let (agent_id, bound) = spawn_agent(StaticGate::passing()).await;
    let client = client_for("http://127.0.0.1:1".to_string(), bound);

    assert_eq!(derive_agent_port(&agent_id, bound).unwrap(), bound);
    assert_eq!(
        client.agent_url(&agent_id).unwrap(),
        format!("http://127.0.0.1:{}", bound)
    );

    let reply = client
        .query_agent(&agent_id, "what now?", Some("eyJwYXltZW50Ijp0cnVlfQ=="))
        .await
        .unwrap();
    assert_eq!(reply.agent_id, "scout-0000");
    assert_eq!(reply.agent_name, "Scout");
    assert_eq!(reply.result, "> ANSWER: 42");

    let health = client.agent_health(&agent_id).await.unwrap();
    assert_eq!(health.agent_id, "scout-0000");
}

#[tokio::test]
async fn unpaid_agent_query_surfaces_402() {
    let (agent_id, bound) = spawn_agent(StaticGate::failing()).await;
    let client = client_for("http://127.0.0.1:1".to_string(), bound);

    let err = client.query_agent(&agent_id, "free?", None).await.unwrap_err();
    assert_eq!(err.status(), Some(402));
}

#[test]
fn client_and_service_agree_on_ports() {
    let client = client_for("http://127.0.0.1:1".to_string(), 4021);
    for agent_id in ["RL-Agent-0007", "X-0999", "agent-0001", "mm-1234", "bot-007"] {
        let expected = derive_agent_port(agent_id, 4021).unwrap();
        assert_eq!(
            client.agent_url(agent_id).unwrap(),
            format!("http://127.0.0.1:{}", expected)
        );
    }
    assert_eq!(client.agent_url("RL-Agent-0007").unwrap(), "http://127.0.0.1:4028");
    assert_eq!(client.agent_url("X-0999").unwrap(), "http://127.0.0.1:5020");
}

#[tokio::test]
async fn non_numeric_agent_id_fails_without_a_request() {
    let client = client_for("http://127.0.0.1:1".to_string(), 4021);
    let err = client.query_agent("agent-alpha", "hi", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Port(_)));
}

async fn spawn_ledger_rpc() -> String {
    let app = Router::new().route(
        "/",
        post(|Json(req): Json<Value>| async move {
            let reply = match req["method"].as_str() {
                Some("getBalance") if req["params"][0] == "ScoutWa11et" => json!({
                    "jsonrpc": "2.0", "id": req["id"],
                    "result": {"context": {"slot": 311}, "value": 1_500_000}
                }),
                Some("getBalance") => json!({
                    "jsonrpc": "2.0", "id": req["id"],
                    "error": {"code": -32602, "message": "Invalid param: WrongSize"}
                }),
                Some("getAccountInfo") => json!({
                    "jsonrpc": "2.0", "id": req["id"],
                    "result": {"context": {"slot": 312}, "value": null}
                }),
                Some("getSlot") => json!({"jsonrpc": "2.0", "id": req["id"], "result": 313}),
                _ => json!({
                    "jsonrpc": "2.0", "id": req["id"],
                    "error": {"code": -32601, "message": "Method not found"}
                }),
            };
            Json(reply)
        }),
    );
    format!("http://{}/", serve(app).await)
}

#[tokio::test]
async fn ledger_client_passes_through_rpc() {
    let ledger = LedgerClient::new(spawn_ledger_rpc().await);

    let balance = ledger.get_balance("ScoutWa11et").await.unwrap();
    assert_eq!(balance.value, 1_500_000);
    assert_eq!(balance.context.slot, 311);

    let info = ledger.get_account_info("Unknown1111").await.unwrap();
    assert!(info.value.is_null());

    assert_eq!(ledger.get_slot().await.unwrap(), 313);

    match ledger.get_balance("bad").await.unwrap_err() {
        ClientError::Rpc { code, message } => {
            assert_eq!(code, -32602);
            assert!(message.contains("WrongSize"));
        }
        other => panic!("expected an RPC error, got {:?}", other),
    }
}

#[tokio::test]
async fn diagram_renderer_returns_rendered_text() {
    let app = Router::new()
        .route(
            "/mermaid/svg",
            post(|source: String| async move {
                format!("<svg><!-- {} --></svg>", source.lines().count())
            }),
        )
        .route(
            "/plantuml/png",
            post(|| async { (StatusCode::BAD_REQUEST, "Syntax Error?") }),
        );
    let renderer = DiagramRenderer::new(format!("http://{}/", serve(app).await));

    let svg = renderer
        .render_mermaid_svg("graph TD\n  Proxy --> Grok\n  Agent --> Grok")
        .await
        .unwrap();
    assert_eq!(svg, "<svg><!-- 3 --></svg>");

    let err = renderer.render("plantuml", "png", "@startuml").await.unwrap_err();
    match err {
        ClientError::Api { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "Syntax Error?");
        }
        other => panic!("expected an API error, got {:?}", other),
    }
}
