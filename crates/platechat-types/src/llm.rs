//! Chat-completion request/response types for platechat.
//!
//! These types model the data shapes exchanged with the remote completion
//! service: ordered messages, the completion result, and the closed error
//! taxonomy every remote call is classified into.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a message in a chat-completion conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message in a chat-completion conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Reason why the remote model stopped generating.
///
/// Values outside the known set are preserved verbatim in `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    #[default]
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishReason::Stop => write!(f, "stop"),
            FinishReason::Length => write!(f, "length"),
            FinishReason::ContentFilter => write!(f, "content_filter"),
            FinishReason::ToolCalls => write!(f, "tool_calls"),
            FinishReason::Other(other) => write!(f, "{other}"),
        }
    }
}

impl From<&str> for FinishReason {
    fn from(s: &str) -> Self {
        match s {
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            "content_filter" => FinishReason::ContentFilter,
            "tool_calls" => FinishReason::ToolCalls,
            other => FinishReason::Other(other.to_string()),
        }
    }
}

/// Result of a successful chat completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub finish_reason: FinishReason,
    /// Provider usage metadata, passed through without interpretation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<serde_json::Value>,
}

/// Structured context attached to a [`CompletionError`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ErrorDetails {
    pub fn endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }
}

/// Errors from a chat-completion call.
///
/// Every transport or HTTP outcome other than success is classified into
/// exactly one of these variants. Callers dispatch on the variant (or on the
/// stable [`code`](CompletionError::code) string), never on the message text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompletionError {
    /// Transport-level connection failure, or a 5xx from the service.
    #[error("{message}")]
    ConnectionFailed {
        message: String,
        details: ErrorDetails,
    },

    #[error("{message}")]
    Timeout {
        message: String,
        details: ErrorDetails,
    },

    #[error("API key is invalid")]
    Unauthorized { details: ErrorDetails },

    #[error("request limit exceeded, please wait before retrying")]
    RateLimited { details: ErrorDetails },

    /// A 4xx response other than 401 and 429.
    #[error("API error: {status}")]
    Api { status: u16, details: ErrorDetails },

    /// A success status whose body could not be used.
    #[error("{message}")]
    InvalidResponse {
        message: String,
        details: ErrorDetails,
    },
}

impl CompletionError {
    pub fn connection_failed(message: impl Into<String>, details: ErrorDetails) -> Self {
        CompletionError::ConnectionFailed {
            message: message.into(),
            details,
        }
    }

    pub fn timeout(message: impl Into<String>, details: ErrorDetails) -> Self {
        CompletionError::Timeout {
            message: message.into(),
            details,
        }
    }

    pub fn invalid_response(message: impl Into<String>, details: ErrorDetails) -> Self {
        CompletionError::InvalidResponse {
            message: message.into(),
            details,
        }
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            CompletionError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            CompletionError::Timeout { .. } => "TIMEOUT",
            CompletionError::Unauthorized { .. } => "UNAUTHORIZED",
            CompletionError::RateLimited { .. } => "RATE_LIMITED",
            CompletionError::Api { .. } => "API_ERROR",
            CompletionError::InvalidResponse { .. } => "INVALID_RESPONSE",
        }
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// Only transport failures, 5xx responses and timeouts are transient.
    /// Credential, policy, request and protocol failures are terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CompletionError::ConnectionFailed { .. } | CompletionError::Timeout { .. }
        )
    }

    pub fn details(&self) -> &ErrorDetails {
        match self {
            CompletionError::ConnectionFailed { details, .. }
            | CompletionError::Timeout { details, .. }
            | CompletionError::Unauthorized { details }
            | CompletionError::RateLimited { details }
            | CompletionError::Api { details, .. }
            | CompletionError::InvalidResponse { details, .. } => details,
        }
    }
}
