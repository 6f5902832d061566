use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::{ClientError, ClientResult};
use super::parse_json;

pub const DEFAULT_LEDGER_RPC_URL: &str = "https://api.devnet.solana.com";

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Value wrapped with the slot it was read at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithContext<T> {
    pub context: RpcContext,
    pub value: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcContext {
    pub slot: u64,
}

/// Pass-through client for a Solana-style ledger JSON-RPC node
#[derive(Debug, Clone)]
pub struct LedgerClient {
    http: Client,
    rpc_url: String,
}

impl LedgerClient {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self::with_http(Client::new(), rpc_url)
    }

    pub fn with_http(http: Client, rpc_url: impl Into<String>) -> Self {
        Self {
            http,
            rpc_url: rpc_url.into(),
        }
    }

    pub fn devnet() -> Self {
        Self::new(DEFAULT_LEDGER_RPC_URL)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> ClientResult<T> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };
        let response: RpcResponse<T> =
            parse_json(self.http.post(&self.rpc_url).json(&request).send().await?).await?;

        if let Some(err) = response.error {
            return Err(ClientError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        response.result.ok_or_else(|| ClientError::Rpc {
            code: -32603,
            message: format!("{} returned no result", method),
        })
    }

    /// Balance of `address` in lamports
    pub async fn get_balance(&self, address: &str) -> ClientResult<WithContext<u64>> {
        self.call("getBalance", json!([address])).await
    }

    /// Raw account info for `address`; `value` is `null` for unknown accounts.
    pub async fn get_account_info(&self, address: &str) -> ClientResult<WithContext<Value>> {
        self.call(
            "getAccountInfo",
            json!([address, {"encoding": "base64"}]),
        )
        .await
    }

    pub async fn get_slot(&self) -> ClientResult<u64> {
        self.call("getSlot", json!([])).await
    }
}
