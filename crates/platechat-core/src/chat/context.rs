//! Per-session conversation record.
//!
//! A `ConversationContext` holds the recognised licence plate and a bounded
//! message history for one session. It is owned by the
//! [`ContextStore`](super::store::ContextStore) and mutated under the
//! session's lock.

use chrono::{DateTime, Duration, Utc};

use platechat_types::llm::{Message, MessageRole};
use platechat_types::session::{LicensePlate, SessionMessage, SessionSnapshot};

/// Maximum number of messages retained per session.
pub const MAX_HISTORY_LENGTH: usize = 20;

#[derive(Debug, Clone)]
pub struct ConversationContext {
    pub session_id: String,
    pub license_plate: Option<LicensePlate>,
    pub messages: Vec<SessionMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            license_plate: None,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message, evicting the oldest history if over the limit.
    pub fn add_message(&mut self, role: MessageRole, content: impl Into<String>) {
        let now = Utc::now();
        self.messages.push(SessionMessage {
            role,
            content: content.into(),
            timestamp: now,
        });
        self.updated_at = now;
        self.trim_history();
    }

    /// Mark the record as active without changing it.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn set_license_plate(&mut self, plate: LicensePlate) {
        self.license_plate = Some(plate);
        self.updated_at = Utc::now();
    }

    /// Drop all messages. The licence plate is kept.
    pub fn clear_history(&mut self) {
        self.messages.clear();
        self.updated_at = Utc::now();
    }

    /// History as role/content pairs for a completion request.
    pub fn messages_for_api(&self) -> Vec<Message> {
        self.messages
            .iter()
            .map(|m| Message::new(m.role, m.content.clone()))
            .collect()
    }

    /// True when the record has been idle for longer than `timeout`.
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now - self.updated_at > timeout
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            license_plate: self.license_plate.clone(),
            messages: self.messages.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Enforce `MAX_HISTORY_LENGTH`.
    ///
    /// System messages are evicted only once no other message is left to
    /// evict; within each group the oldest go first and order is preserved.
    fn trim_history(&mut self) {
        if self.messages.len() <= MAX_HISTORY_LENGTH {
            return;
        }

        let (mut system, others): (Vec<_>, Vec<_>) = self
            .messages
            .drain(..)
            .partition(|m| m.role == MessageRole::System);

        if system.len() >= MAX_HISTORY_LENGTH {
            let excess = system.len() - MAX_HISTORY_LENGTH;
            system.drain(..excess);
            self.messages = system;
            return;
        }

        let keep = MAX_HISTORY_LENGTH - system.len();
        let skip = others.len().saturating_sub(keep);
        self.messages = system;
        self.messages.extend(others.into_iter().skip(skip));
    }
}
