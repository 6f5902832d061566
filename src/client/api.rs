use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::error::ClientResult;
use super::parse_json;
use crate::config::AgentServiceConfig;
use crate::handlers::{
    AgentHealthResponse, AgentQueryRequest, AgentQueryResponse, HealthResponse, ProxyQueryRequest,
};
use crate::llm::NormalizedCompletion;
use crate::payment::PAYMENT_HEADER;
use crate::port::{derive_agent_port, DEFAULT_AGENT_BASE_PORT};

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the proxy service
    pub proxy_url: String,
    /// Scheme and host the agent services run on, without port
    pub agent_host: String,
    /// Base port agent ports are derived from
    pub agent_base_port: u16,
    /// Per-request timeout
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy_url: "http://localhost:3000".to_string(),
            agent_host: "http://localhost".to_string(),
            agent_base_port: DEFAULT_AGENT_BASE_PORT,
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ClientConfig {
    /// Local defaults, with agent ports derived from the same base port the
    /// agent services were started with.
    pub fn for_agent_service(service: &AgentServiceConfig) -> Self {
        Self {
            agent_base_port: service.agent_base_port,
            ..Self::default()
        }
    }
}

/// Client for the proxy and agent services. Every method sends exactly one
/// request.
#[derive(Debug, Clone)]
pub struct SwarmClient {
    http: Client,
    config: ClientConfig,
}

impl SwarmClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            config: ClientConfig {
                proxy_url: config.proxy_url.trim_end_matches('/').to_string(),
                agent_host: config.agent_host.trim_end_matches('/').to_string(),
                ..config
            },
        })
    }

    /// Client for services on localhost. The agent base port is fixed at
    /// `DEFAULT_AGENT_BASE_PORT`; use [`ClientConfig::for_agent_service`] when
    /// `AGENT_BASE_PORT` is overridden.
    pub fn local() -> ClientResult<Self> {
        Self::new(ClientConfig::default())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `GET /health` on the proxy
    pub async fn health(&self) -> ClientResult<HealthResponse> {
        let url = format!("{}/health", self.config.proxy_url);
        parse_json(self.http.get(&url).send().await?).await
    }

    /// `POST /api/grok` on the proxy
    pub async fn query_proxy(
        &self,
        id: &str,
        kind: &str,
        query: &str,
    ) -> ClientResult<NormalizedCompletion> {
        let url = format!("{}/api/grok", self.config.proxy_url);
        let body = ProxyQueryRequest {
            id: Some(id.to_string()),
            kind: Some(kind.to_string()),
            query: Some(query.to_string()),
        };
        parse_json(self.http.post(&url).json(&body).send().await?).await
    }

    /// Base URL of the agent service for `agent_id`
    pub fn agent_url(&self, agent_id: &str) -> ClientResult<String> {
        let port = derive_agent_port(agent_id, self.config.agent_base_port)?;
        Ok(format!("{}:{}", self.config.agent_host, port))
    }

    /// `POST /query` directly on the agent's own service.
    ///
    /// `payment` is sent as the `X-PAYMENT` header; without it the agent's
    /// payment gate answers 402, surfaced as `ClientError::Api`.
    pub async fn query_agent(
        &self,
        agent_id: &str,
        query: &str,
        payment: Option<&str>,
    ) -> ClientResult<AgentQueryResponse> {
        let url = format!("{}/query", self.agent_url(agent_id)?);
        debug!("Querying agent {} at {}", agent_id, url);

        let mut request = self.http.post(&url).json(&AgentQueryRequest {
            query: Some(query.to_string()),
        });
        if let Some(payment) = payment {
            request = request.header(PAYMENT_HEADER, payment);
        }
        parse_json(request.send().await?).await
    }

    /// `GET /health` on the agent's own service
    pub async fn agent_health(&self, agent_id: &str) -> ClientResult<AgentHealthResponse> {
        let url = format!("{}/health", self.agent_url(agent_id)?);
        parse_json(self.http.get(&url).send().await?).await
    }
}
