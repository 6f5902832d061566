//! Backend for the agent swarm demo: a completion proxy, per-agent paid query
//! services and a client library for both.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod payment;
pub mod port;
pub mod prompts;
pub mod routes;
pub mod state;

pub use error::{ErrorPolicy, ServiceError};
pub use port::{derive_agent_port, PortDerivationError, DEFAULT_AGENT_BASE_PORT};
