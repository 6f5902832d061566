use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AgentIdentity;

pub const X402_VERSION: u32 = 1;
pub const QUERY_PRICE: &str = "$0.001";
pub const DEFAULT_FACILITATOR_TIMEOUT: Duration = Duration::from_secs(10);

/// What a caller has to pay before a gated resource is served.
///
/// Mirrors the route-level price config of the local facilitator mock, not
/// the full x402 requirements object (`maxAmountRequired`, `asset`,
/// `maxTimeoutSeconds`), so a production facilitator would refuse it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    pub scheme: String,
    pub network: String,
    pub price: String,
    pub pay_to: String,
    pub resource: String,
    pub description: String,
}

impl PaymentRequirements {
    /// Requirements for an agent's `/query` endpoint
    pub fn for_agent_query(identity: &AgentIdentity, network: &str) -> Self {
        Self {
            scheme: "exact".to_string(),
            network: network.to_string(),
            price: QUERY_PRICE.to_string(),
            pay_to: identity.wallet_address.clone(),
            resource: "/query".to_string(),
            description: format!("Query {} ({})", identity.name, identity.agent_id),
        }
    }
}

/// Outcome of a payment check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Pass,
    Reject { reason: String },
}

impl GateDecision {
    pub fn reject(reason: impl Into<String>) -> Self {
        Self::Reject {
            reason: reason.into(),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// A check that runs before a gated handler
#[async_trait]
pub trait PaymentGate: Send + Sync {
    async fn verify(
        &self,
        payment_header: Option<&str>,
        requirements: &PaymentRequirements,
    ) -> GateDecision;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest<'a> {
    x402_version: u32,
    payment_header: &'a str,
    payment_requirements: &'a PaymentRequirements,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyResponse {
    is_valid: bool,
    #[serde(default)]
    invalid_reason: Option<String>,
}

/// Gate that asks an x402 facilitator to verify the `X-PAYMENT` header.
/// A facilitator that does not answer within `timeout` counts as unavailable.
#[derive(Debug, Clone)]
pub struct FacilitatorGate {
    client: Client,
    facilitator_url: String,
}

impl FacilitatorGate {
    pub fn new(facilitator_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            facilitator_url: facilitator_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PaymentGate for FacilitatorGate {
    async fn verify(
        &self,
        payment_header: Option<&str>,
        requirements: &PaymentRequirements,
    ) -> GateDecision {
        let Some(header) = payment_header.filter(|h| !h.is_empty()) else {
            return GateDecision::reject("X-PAYMENT header is required");
        };

        let url = format!("{}/verify", self.facilitator_url);
        let body = VerifyRequest {
            x402_version: X402_VERSION,
            payment_header: header,
            payment_requirements: requirements,
        };

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Facilitator unreachable at {}: {}", url, e);
                return GateDecision::reject("Payment verification unavailable");
            }
        };

        if !response.status().is_success() {
            warn!("Facilitator returned {}", response.status());
            return GateDecision::reject("Payment verification failed");
        }

        match response.json::<VerifyResponse>().await {
            Ok(VerifyResponse { is_valid: true, .. }) => {
                debug!("Payment verified for {}", requirements.resource);
                GateDecision::Pass
            }
            Ok(VerifyResponse { invalid_reason, .. }) => GateDecision::reject(
                invalid_reason.unwrap_or_else(|| "Payment is invalid".to_string()),
            ),
            Err(e) => {
                warn!("Unreadable facilitator reply: {}", e);
                GateDecision::reject("Payment verification failed")
            }
        }
    }
}
