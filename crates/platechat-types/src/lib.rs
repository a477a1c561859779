//! Shared domain types for platechat.
//!
//! This crate contains the data shapes used across the gateway: chat
//! messages, completion results and errors, licence-plate context, session
//! snapshots, inbound request records, and configuration.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod session;
