//! Inbound chat request and outbound reply records.
//!
//! `ChatRequest` is validated once at the boundary (`ChatRequest::from_json`)
//! and trusted afterwards. Conversation-history entries are deliberately
//! loose: their role and content are defaulted by the prompt assembler,
//! not rejected here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::session::LicensePlate;

/// Maximum length of a chat message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 10_000;

/// One prior turn supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Optional structured context accompanying a chat message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatContext {
    #[serde(default)]
    pub license_plate: Option<LicensePlate>,
    #[serde(default)]
    pub conversation_history: Vec<HistoryEntry>,
}

/// A validated chat request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ChatContext>,
    /// Continue a stored conversation when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ChatRequest {
    /// Build a request from a plain message, validating its length.
    pub fn new(message: impl Into<String>) -> Result<Self, ValidationError> {
        let message = message.into();
        validate_message(&message)?;
        Ok(Self {
            message,
            context: None,
            session_id: None,
        })
    }

    pub fn with_context(mut self, context: ChatContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Validate a decoded JSON body and build a request from it.
    ///
    /// - A body that is not an object, or is an empty object, is `InvalidBody`.
    /// - `message` must be a non-empty string of at most [`MAX_MESSAGE_CHARS`]
    ///   characters.
    /// - `context` may be absent, null, or empty (treated as absent);
    ///   otherwise it must be an object matching [`ChatContext`].
    /// - `session_id`, when present, must be a non-empty string.
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let obj = match body.as_object() {
            Some(obj) if !obj.is_empty() => obj,
            _ => return Err(ValidationError::InvalidBody),
        };

        let message = match obj.get("message") {
            None | Some(Value::Null) => return Err(ValidationError::MissingMessage),
            Some(Value::String(s)) if s.is_empty() => {
                return Err(ValidationError::MissingMessage);
            }
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(ValidationError::MessageNotString),
        };
        validate_message(&message)?;

        let context = match obj.get("context") {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) if map.is_empty() => None,
            Some(Value::Array(items)) if items.is_empty() => None,
            Some(value @ Value::Object(_)) => Some(
                serde_json::from_value::<ChatContext>(value.clone())
                    .map_err(|e| ValidationError::InvalidContext(e.to_string()))?,
            ),
            Some(_) => {
                return Err(ValidationError::InvalidContext(
                    "context must be an object".to_string(),
                ));
            }
        };

        let session_id = match obj.get("session_id") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(_) => return Err(ValidationError::InvalidSessionId),
        };

        Ok(Self {
            message,
            context,
            session_id,
        })
    }
}

fn validate_message(message: &str) -> Result<(), ValidationError> {
    if message.is_empty() {
        return Err(ValidationError::MissingMessage);
    }
    let chars = message.chars().count();
    if chars > MAX_MESSAGE_CHARS {
        return Err(ValidationError::MessageTooLong {
            max: MAX_MESSAGE_CHARS,
            actual: chars,
        });
    }
    Ok(())
}

/// Reply relayed back to the caller on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub context_used: bool,
}
