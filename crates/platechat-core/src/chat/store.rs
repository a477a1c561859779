//! In-memory session store with idle expiry.
//!
//! `ContextStore` maps session ids to shared [`ConversationContext`]
//! records. Each record sits behind its own async mutex so concurrent
//! requests on one session serialize without blocking other sessions.
//! The `DashMap` guard is never held across an `.await`: callers get a
//! cloned `Arc` handle and lock it themselves.
//!
//! Expired records are swept on every lookup. A record whose lock is held
//! is in use and is skipped by the sweep.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;

use super::context::ConversationContext;

/// Idle time after which a session is discarded.
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(3600);

/// Shared, lockable handle to one session record.
pub type SessionHandle = Arc<Mutex<ConversationContext>>;

#[derive(Debug)]
pub struct ContextStore {
    sessions: DashMap<String, SessionHandle>,
    timeout: chrono::Duration,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::with_timeout(SESSION_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            timeout: chrono::Duration::from_std(timeout).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Return the record for `session_id`, creating an empty one if absent.
    ///
    /// Two calls with the same id return handles to the same record.
    pub fn get_or_create(&self, session_id: &str) -> SessionHandle {
        self.sweep_expired();
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(session_id, "created conversation context");
                Arc::new(Mutex::new(ConversationContext::new(session_id)))
            })
            .value()
            .clone()
    }

    /// Look up an existing, unexpired record.
    pub fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sweep_expired();
        self.sessions.get(session_id).map(|r| r.value().clone())
    }

    /// Remove a record. Returns whether it existed.
    pub fn delete(&self, session_id: &str) -> bool {
        self.sweep_expired();
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            tracing::debug!(session_id, "deleted conversation context");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop every idle record older than the store timeout.
    ///
    /// Returns the number of records removed.
    pub fn sweep_expired(&self) -> usize {
        let now = chrono::Utc::now();
        let timeout = self.timeout;
        let before = self.sessions.len();

        self.sessions.retain(|_, handle| match handle.try_lock() {
            Ok(ctx) => !ctx.is_expired(now, timeout),
            Err(_) => true,
        });

        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::info!(removed, "swept expired sessions");
        }
        removed
    }
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new()
    }
}
