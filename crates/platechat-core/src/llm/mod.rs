//! Chat-completion abstractions for platechat.
//!
//! - `CompletionProvider`: RPITIT trait for concrete completion clients
//! - `RetryPolicy` / `retry_with_backoff`: bounded exponential backoff

pub mod provider;
pub mod retry;
