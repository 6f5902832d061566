use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use swarm_backend::config::{
    AgentIdentity, AgentServiceConfig, DEFAULT_AGENT_DESCRIPTION, DEFAULT_AGENT_ID,
    DEFAULT_AGENT_NAME, DEFAULT_WALLET_ADDRESS,
};
use swarm_backend::derive_agent_port;
use swarm_backend::routes::create_agent_routes;
use swarm_backend::state::AgentState;

/// Serve paid queries for a single swarm agent
#[derive(Debug, Parser)]
#[command(name = "agent-server", version)]
struct Args {
    /// Agent id; its last four characters select the port
    #[arg(default_value = DEFAULT_AGENT_ID)]
    agent_id: String,

    /// Display name
    #[arg(default_value = DEFAULT_AGENT_NAME)]
    name: String,

    #[arg(default_value = DEFAULT_AGENT_DESCRIPTION)]
    description: String,

    /// Wallet that receives query payments
    #[arg(default_value = DEFAULT_WALLET_ADDRESS)]
    wallet_address: String,
}

impl From<Args> for AgentIdentity {
    fn from(args: Args) -> Self {
        Self {
            agent_id: args.agent_id,
            name: args.name,
            description: args.description,
            wallet_address: args.wallet_address,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("swarm_backend=debug,agent_server=debug,tower_http=debug")),
        )
        .init();

    let identity = AgentIdentity::from(Args::parse());
    let config = AgentServiceConfig::load()?;

    let port = derive_agent_port(&identity.agent_id, config.agent_base_port)
        .context("cannot derive a listening port for this agent")?;

    let upstream = config.upstream.resolve();
    if upstream.api_key.is_none() {
        warn!("GROK_API_KEY is not set; paid queries will fail");
    }
    info!(
        "Payments for {} go to {} via {}",
        identity.agent_id, identity.wallet_address, config.facilitator_url
    );

    let name = identity.name.clone();
    let state = AgentState::new(
        identity,
        upstream,
        &config.facilitator_url,
        &config.payment_network,
        config.facilitator_timeout(),
    )?;

    let app = create_agent_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.bind_host, port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.bind_host, port))?;
    info!("Agent {} listening on port {}", name, port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
