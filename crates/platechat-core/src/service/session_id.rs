//! SessionIdGenerator trait for issuing session identifiers.
//!
//! Defined in platechat-core so handlers can mint ids without coupling to a
//! specific hashing scheme. The `Sha256SessionIdGenerator` adapter lives in
//! platechat-infra.

/// Length, in hex characters, of every generated session id.
pub const SESSION_ID_LEN: usize = 32;

/// Mints opaque session ids from caller-supplied identity hints.
///
/// Ids are lookup keys, not credentials: they are unique per call but carry
/// no authentication meaning.
pub trait SessionIdGenerator: Send + Sync {
    /// Produce a new `SESSION_ID_LEN`-character lowercase hex id.
    ///
    /// Missing hints hash as empty strings.
    fn generate(&self, user_id: Option<&str>, device_id: Option<&str>) -> String;
}
