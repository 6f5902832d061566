use std::net::SocketAddr;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use swarm_backend::config::ProxyConfig;
use swarm_backend::routes::create_proxy_routes;
use swarm_backend::state::ProxyState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("swarm_backend=debug,tower_http=debug")),
        )
        .init();

    let config = ProxyConfig::load()?;
    let upstream = config.upstream.resolve();
    if upstream.api_key.is_none() {
        warn!("GROK_API_KEY is not set; /api/grok will answer with a configuration error");
    }

    let state = ProxyState::new(upstream)?;

    let app = create_proxy_routes(state, &config.public_dir)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.bind_host, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.bind_host, config.port))?;
    info!("Serving static files from {}", config.public_dir.display());
    info!("Starting proxy server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
