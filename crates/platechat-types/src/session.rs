//! Licence-plate context and conversation session types.
//!
//! A session is a caller-scoped conversation lifetime. The mutable record
//! itself lives in the core context store; this module holds the value
//! types it is built from and the serializable snapshot handed to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// Re-export MessageRole from llm module (it's used in both session and llm contexts).
pub use crate::llm::MessageRole;

/// A recognised Japanese licence plate, as produced by the plate reader.
///
/// Every field is optional; the reader may fail to recognise any part.
/// Unknown fields in the inbound JSON are ignored. Text fields also accept
/// JSON numbers (`"serial_number": 1234`) and keep their decimal form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LicensePlate {
    /// Issuing region name (e.g. "品川").
    #[serde(default, deserialize_with = "text_or_number")]
    pub region: Option<String>,
    /// Vehicle classification number (e.g. "330").
    #[serde(default, deserialize_with = "text_or_number")]
    pub classification_number: Option<String>,
    /// Single hiragana syllable (e.g. "あ").
    #[serde(default, deserialize_with = "text_or_number")]
    pub hiragana: Option<String>,
    /// Serial number (e.g. "1234").
    #[serde(default, deserialize_with = "text_or_number")]
    pub serial_number: Option<String>,
    /// The full plate text (e.g. "品川330あ1234").
    #[serde(default, deserialize_with = "text_or_number")]
    pub full_text: Option<String>,
    /// Recognition confidence as a percentage.
    #[serde(default)]
    pub confidence: Option<f64>,
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    }))
}

impl LicensePlate {
    /// True when the reader recognised nothing at all.
    pub fn is_empty(&self) -> bool {
        self.region.is_none()
            && self.classification_number.is_none()
            && self.hiragana.is_none()
            && self.serial_number.is_none()
            && self.full_text.is_none()
            && self.confidence.is_none()
    }
}

/// A message stored in a session's history, stamped with its arrival time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Point-in-time copy of a conversation record, safe to serialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub license_plate: Option<LicensePlate>,
    pub messages: Vec<SessionMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
