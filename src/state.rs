use std::sync::Arc;
use std::time::Duration;

use crate::config::{AgentIdentity, UpstreamConfig};
use crate::llm::{ChatCompletionClient, OpenAICompatibleClient};
use crate::payment::{FacilitatorGate, PaymentGate, PaymentRequirements};

/// Shared state of the Request Proxy Service
#[derive(Clone)]
pub struct ProxyState {
    pub upstream: Arc<UpstreamConfig>,
    pub completions: Arc<dyn ChatCompletionClient>,
}

impl ProxyState {
    pub fn new(upstream: UpstreamConfig) -> anyhow::Result<Self> {
        let completions = Arc::new(OpenAICompatibleClient::new(&upstream)?);
        Ok(Self::with_client(upstream, completions))
    }

    pub fn with_client(upstream: UpstreamConfig, completions: Arc<dyn ChatCompletionClient>) -> Self {
        Self {
            upstream: Arc::new(upstream),
            completions,
        }
    }
}

/// Shared state of one Per-Agent Query Service instance. Nothing in here
/// changes after startup.
#[derive(Clone)]
pub struct AgentState {
    pub identity: Arc<AgentIdentity>,
    pub upstream: Arc<UpstreamConfig>,
    pub completions: Arc<dyn ChatCompletionClient>,
    pub gate: Arc<dyn PaymentGate>,
    pub requirements: Arc<PaymentRequirements>,
}

impl AgentState {
    pub fn new(
        identity: AgentIdentity,
        upstream: UpstreamConfig,
        facilitator_url: &str,
        payment_network: &str,
        facilitator_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let completions = Arc::new(OpenAICompatibleClient::new(&upstream)?);
        let gate = Arc::new(FacilitatorGate::new(facilitator_url, facilitator_timeout)?);
        Ok(Self::with_parts(
            identity,
            upstream,
            completions,
            gate,
            payment_network,
        ))
    }

    pub fn with_parts(
        identity: AgentIdentity,
        upstream: UpstreamConfig,
        completions: Arc<dyn ChatCompletionClient>,
        gate: Arc<dyn PaymentGate>,
        payment_network: &str,
    ) -> Self {
        let requirements = PaymentRequirements::for_agent_query(&identity, payment_network);
        Self {
            identity: Arc::new(identity),
            upstream: Arc::new(upstream),
            completions,
            gate,
            requirements: Arc::new(requirements),
        }
    }
}
