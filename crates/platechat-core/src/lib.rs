//! Business logic for platechat.
//!
//! This crate defines the "ports" (provider and session-id traits) that the
//! infrastructure layer implements, plus the logic that sits between them:
//! retry/backoff, the session context store, and prompt assembly. It depends
//! only on `platechat-types` -- never on `platechat-infra` or any HTTP crate.

pub mod chat;
pub mod llm;
pub mod service;
