//! Client library for the swarm services.
//!
//! [`SwarmClient`] wraps the proxy and agent REST endpoints. [`LedgerClient`]
//! and [`DiagramRenderer`] are thin pass-throughs to a ledger JSON-RPC node and
//! a diagram rendering service.

pub mod api;
pub mod diagram;
pub mod error;
pub mod ledger;

pub use api::*;
pub use diagram::*;
pub use error::*;
pub use ledger::*;

use reqwest::Response;
use serde::de::DeserializeOwned;

/// Parse a JSON body, or turn a non-success status into `ClientError::Api`.
pub(crate) async fn parse_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let text = checked_text(response).await?;
    Ok(serde_json::from_str(&text)?)
}

/// Read the body as text, or turn a non-success status into `ClientError::Api`.
pub(crate) async fn checked_text(response: Response) -> ClientResult<String> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(ClientError::Api {
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(text)
}
