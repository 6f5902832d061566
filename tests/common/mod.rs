#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use swarm_backend::config::UpstreamConfig;
use swarm_backend::llm::{ChatCompletionClient, ChatCompletionRequest};
use swarm_backend::payment::{GateDecision, PaymentGate, PaymentRequirements};
use swarm_backend::ServiceError;

/// What the stub completion API does when called
pub enum StubReply {
    Body(Value),
    Status(u16, Value),
    Unreachable,
}

/// Completion backend that records calls instead of touching the network
pub struct StubCompletions {
    reply: StubReply,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatCompletionRequest>>,
}

impl StubCompletions {
    pub fn new(reply: StubReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn answering(content: &str) -> Arc<Self> {
        Self::new(StubReply::Body(json!({
            "id": "cmpl-test",
            "model": "grok-2-latest",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ChatCompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatCompletionClient for StubCompletions {
    async fn create_chat_completion(
        &self,
        _api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<Value, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match &self.reply {
            StubReply::Body(body) => Ok(body.clone()),
            StubReply::Status(status, body) => {
                Err(ServiceError::from_upstream(*status, &body.to_string()))
            }
            StubReply::Unreachable => Err(ServiceError::InternalUnexpected(
                "connection refused".to_string(),
            )),
        }
    }
}

/// Payment gate with a fixed answer
pub struct StaticGate {
    pass: bool,
    calls: AtomicUsize,
}

impl StaticGate {
    pub fn passing() -> Arc<Self> {
        Arc::new(Self {
            pass: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            pass: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGate for StaticGate {
    async fn verify(
        &self,
        _payment_header: Option<&str>,
        _requirements: &PaymentRequirements,
    ) -> GateDecision {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.pass {
            GateDecision::Pass
        } else {
            GateDecision::reject("payment not verified")
        }
    }
}

pub fn upstream(api_key: Option<&str>) -> UpstreamConfig {
    UpstreamConfig {
        api_key: api_key.map(str::to_string),
        model: "grok-2-latest".to_string(),
        base_url: "http://127.0.0.1:9/v1".to_string(),
        timeout: Some(Duration::from_secs(5)),
    }
}

/// Send one request through `router` and decode the JSON reply.
pub async fn json_request(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    let body = match body {
        Some(json_body) => Body::from(serde_json::to_vec(&json_body).unwrap()),
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(json!(null));

    (status, json)
}

/// Serve `router` on a loopback port and return its address.
pub async fn serve(router: Router) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    serve_on(listener, router).await
}

pub async fn serve_on(listener: tokio::net::TcpListener, router: Router) -> std::net::SocketAddr {
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
