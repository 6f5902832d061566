use async_trait::async_trait;
use serde_json::Value;

use super::types::ChatCompletionRequest;
use crate::error::ServiceError;

/// A stateless chat completion backend.
///
/// Implementations make exactly one attempt per call and return the raw reply
/// body; normalization is left to the caller.
#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    async fn create_chat_completion(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<Value, ServiceError>;
}
