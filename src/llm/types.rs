use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder returned when the completion API produced no content
pub const NO_RESPONSE_PLACEHOLDER: &str = "No response generated.";

/// A single chat message in OpenAI wire format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of a `POST /chat/completions` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A completion reply reduced to the fixed `{ result }` shape, keeping the
/// upstream `model` and `choices` for callers that want them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedCompletion {
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Value>>,
}

/// Normalize a raw completion API reply.
///
/// Never fails: a missing choice list, a missing message or empty content all
/// yield [`NO_RESPONSE_PLACEHOLDER`].
pub fn normalize_completion(body: Value) -> NormalizedCompletion {
    let result = body
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty())
        .unwrap_or(NO_RESPONSE_PLACEHOLDER)
        .to_string();

    let model = body
        .get("model")
        .and_then(Value::as_str)
        .map(str::to_string);

    let choices = match body {
        Value::Object(mut map) => match map.remove("choices") {
            Some(Value::Array(choices)) => Some(choices),
            _ => None,
        },
        _ => None,
    };

    NormalizedCompletion {
        result,
        model,
        choices,
    }
}
