//! Wire types for the chat-completions protocol.
//!
//! These mirror the JSON exchanged with the remote service. They are NOT the
//! provider-agnostic types from platechat-types.

use serde::{Deserialize, Serialize};

use platechat_types::llm::MessageRole;

/// Request body for `POST /v1/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage<'a>>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireMessage<'a> {
    pub role: MessageRole,
    pub content: &'a str,
}

/// Successful response body. Only the fields the gateway reads are modelled.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
    /// Passed through without interpretation.
    #[serde(default)]
    pub usage: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: ChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_expected_shape() {
        let req = ChatCompletionRequest {
            model: "qwen-plus",
            messages: vec![WireMessage {
                role: MessageRole::User,
                content: "こんにちは",
            }],
            temperature: 0.7,
            max_tokens: 2048,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "qwen-plus");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["temperature"], 0.7);
        assert_eq!(json["max_tokens"], 2048);
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let resp: ChatCompletionResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.choices.is_none());

        let resp: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"hi"},"finish_reason":"stop"}],"usage":{"total_tokens":12}}"#,
        )
        .unwrap();
        let choices = resp.choices.unwrap();
        assert_eq!(choices[0].message.content.as_deref(), Some("hi"));
        assert_eq!(resp.usage.unwrap()["total_tokens"], 12);
    }
}
