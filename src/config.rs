use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::ServiceError;
use crate::payment::DEFAULT_FACILITATOR_TIMEOUT;
use crate::port::DEFAULT_AGENT_BASE_PORT;

pub const MISSING_API_KEY_MESSAGE: &str = "Grok API key not configured";

pub const DEFAULT_AGENT_ID: &str = "agent-0001";
pub const DEFAULT_AGENT_NAME: &str = "Swarm Agent";
pub const DEFAULT_AGENT_DESCRIPTION: &str = "An autonomous agent participating in the swarm.";
pub const DEFAULT_WALLET_ADDRESS: &str = "11111111111111111111111111111111";

/// Build a `config::Config` from the optional `swarm.*` file in the working
/// directory, overridden by environment variables.
fn layered_source() -> Result<config::Config> {
    config::Config::builder()
        .add_source(config::File::with_name("swarm").required(false))
        .add_source(config::Environment::default().try_parsing(true))
        .build()
        .context("failed to assemble configuration sources")
}

fn deserialize<T: DeserializeOwned>(source: config::Config) -> Result<T> {
    source
        .try_deserialize()
        .context("failed to deserialize configuration")
}

/// Settings for the Request Proxy Service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    #[serde(default = "default_proxy_port")]
    pub port: u16,

    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    #[serde(skip)]
    pub upstream: UpstreamSettings,
}

impl ProxyConfig {
    pub fn load() -> Result<Self> {
        Self::from_source(layered_source()?)
    }

    pub fn from_source(source: config::Config) -> Result<Self> {
        let mut cfg: Self = deserialize(source.clone())?;
        cfg.upstream = deserialize(source)?;
        Ok(cfg)
    }
}

/// Settings for the Per-Agent Query Service. The agent identity itself comes
/// from the command line, see [`AgentIdentity`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentServiceConfig {
    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    #[serde(default = "default_agent_base_port")]
    pub agent_base_port: u16,

    #[serde(default = "default_facilitator_url")]
    pub facilitator_url: String,

    #[serde(default = "default_payment_network")]
    pub payment_network: String,

    /// Upper bound on one facilitator `/verify` call
    #[serde(default = "default_facilitator_timeout_secs")]
    pub facilitator_timeout_secs: u64,

    #[serde(skip)]
    pub upstream: UpstreamSettings,
}

impl AgentServiceConfig {
    pub fn load() -> Result<Self> {
        Self::from_source(layered_source()?)
    }

    pub fn from_source(source: config::Config) -> Result<Self> {
        let mut cfg: Self = deserialize(source.clone())?;
        cfg.upstream = deserialize(source)?;
        Ok(cfg)
    }

    pub fn facilitator_timeout(&self) -> Duration {
        Duration::from_secs(self.facilitator_timeout_secs)
    }
}

/// Raw completion API settings, as read from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamSettings {
    #[serde(default)]
    pub grok_api_key: Option<String>,

    #[serde(default = "default_model")]
    pub grok_model: String,

    #[serde(default = "default_base_url")]
    pub grok_base_url: String,

    #[serde(default)]
    pub upstream_timeout_secs: Option<u64>,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            grok_api_key: None,
            grok_model: default_model(),
            grok_base_url: default_base_url(),
            upstream_timeout_secs: None,
        }
    }
}

impl UpstreamSettings {
    pub fn resolve(&self) -> UpstreamConfig {
        UpstreamConfig {
            api_key: self
                .grok_api_key
                .as_ref()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            model: self.grok_model.clone(),
            base_url: self.grok_base_url.trim_end_matches('/').to_string(),
            timeout: self.upstream_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Resolved completion API settings shared by both services
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl UpstreamConfig {
    /// The API key, or a `Configuration` error when none is set. Handlers call
    /// this before any outbound request.
    pub fn require_api_key(&self) -> Result<&str, ServiceError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ServiceError::Configuration(MISSING_API_KEY_MESSAGE.to_string()))
    }
}

/// Identity of one agent service instance; fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentIdentity {
    pub agent_id: String,
    pub name: String,
    pub description: String,
    pub wallet_address: String,
}

impl Default for AgentIdentity {
    fn default() -> Self {
        Self {
            agent_id: DEFAULT_AGENT_ID.to_string(),
            name: DEFAULT_AGENT_NAME.to_string(),
            description: DEFAULT_AGENT_DESCRIPTION.to_string(),
            wallet_address: DEFAULT_WALLET_ADDRESS.to_string(),
        }
    }
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_proxy_port() -> u16 {
    3000
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_agent_base_port() -> u16 {
    DEFAULT_AGENT_BASE_PORT
}

fn default_facilitator_url() -> String {
    "http://localhost:3002/facilitator".to_string()
}

fn default_payment_network() -> String {
    "solana-devnet".to_string()
}

fn default_facilitator_timeout_secs() -> u64 {
    DEFAULT_FACILITATOR_TIMEOUT.as_secs()
}

fn default_model() -> String {
    "grok-2-latest".to_string()
}

fn default_base_url() -> String {
    "https://api.x.ai/v1".to_string()
}
