//! CompletionProvider trait definition.
//!
//! The single seam between chat orchestration and a concrete remote
//! chat-completion client. Uses RPITIT (Rust 2024 edition) so implementations
//! write plain `async` bodies without boxing.

use platechat_types::llm::{CompletionError, CompletionResponse, Message};

/// Trait for chat-completion backends.
///
/// Implementations live in platechat-infra (e.g., `ChatCompletionsClient`).
/// A call is expected to carry its own retry policy: callers treat any
/// returned error as final.
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name, used in logs and spans.
    fn name(&self) -> &str;

    /// Model identifier sent with every request.
    fn model(&self) -> &str;

    /// Send an ordered message list and receive the assistant reply.
    fn chat(
        &self,
        messages: &[Message],
    ) -> impl std::future::Future<Output = Result<CompletionResponse, CompletionError>> + Send;
}
