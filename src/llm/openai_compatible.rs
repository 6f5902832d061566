use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::interface::ChatCompletionClient;
use super::types::ChatCompletionRequest;
use crate::config::UpstreamConfig;
use crate::error::ServiceError;

/// Chat completion client for OpenAI-compatible APIs (xAI Grok by default)
#[derive(Debug, Clone)]
pub struct OpenAICompatibleClient {
    client: Client,
    base_url: String,
}

impl OpenAICompatibleClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ServiceError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        info!(
            "Initialized OpenAICompatibleClient: model={}, base_url={}",
            config.model, config.base_url
        );
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatCompletionClient for OpenAICompatibleClient {
    async fn create_chat_completion(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<Value, ServiceError> {
        let url = self.completions_url();
        debug!("POST {} model={}", url, request.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Completion API returned {}: {}", status, body);
            return Err(ServiceError::from_upstream(status.as_u16(), &body));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ServiceError::InternalUnexpected(format!("invalid completion reply: {}", e)))
    }
}
