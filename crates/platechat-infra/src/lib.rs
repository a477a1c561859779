//! Infrastructure layer for platechat.
//!
//! Contains implementations of the traits defined in `platechat-core`:
//! the HTTP chat-completions client, SHA-256 session id generation, and
//! gateway configuration loading.

pub mod config;
pub mod crypto;
pub mod llm;
