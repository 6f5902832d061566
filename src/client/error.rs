use thiserror::Error;

use crate::port::PortDerivationError;

/// Errors returned by the client library
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status
    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    /// A JSON-RPC endpoint answered with an error object
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Cannot locate agent: {0}")]
    Port(#[from] PortDerivationError),
}

impl ClientError {
    /// HTTP status of an `Api` error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
