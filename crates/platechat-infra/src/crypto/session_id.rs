//! SHA-256 session id generation.
//!
//! Implements the `SessionIdGenerator` trait from `platechat-core` using the
//! `sha2` crate (RustCrypto ecosystem).

use sha2::{Digest, Sha256};

use platechat_core::service::session_id::{SESSION_ID_LEN, SessionIdGenerator};

/// Hashes `"{user_id}:{device_id}:{unix_time}:{nonce}"` and keeps the first
/// `SESSION_ID_LEN` hex characters.
///
/// The timestamp has sub-second precision; the v7 UUID nonce keeps ids
/// distinct when two calls land on the same clock tick.
pub struct Sha256SessionIdGenerator;

impl Sha256SessionIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Sha256SessionIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionIdGenerator for Sha256SessionIdGenerator {
    fn generate(&self, user_id: Option<&str>, device_id: Option<&str>) -> String {
        let now = chrono::Utc::now();
        let unix_time = now.timestamp() as f64 + f64::from(now.timestamp_subsec_nanos()) / 1e9;
        let data = format!(
            "{}:{}:{unix_time}:{}",
            user_id.unwrap_or_default(),
            device_id.unwrap_or_default(),
            uuid::Uuid::now_v7()
        );
        let digest = Sha256::digest(data.as_bytes());
        let mut id = format!("{:x}", digest);
        id.truncate(SESSION_ID_LEN);
        id
    }
}
