//! Completion provider implementations.
//!
//! Contains the concrete [`CompletionProvider`] used by the gateway and a
//! factory ([`create_client`]) that builds it from a [`GatewayConfig`].
//!
//! [`CompletionProvider`]: platechat_core::llm::provider::CompletionProvider

pub mod chat_completions;

use platechat_types::config::GatewayConfig;

use self::chat_completions::ChatCompletionsClient;
use self::chat_completions::config::ChatCompletionsConfig;

/// Create the completion client described by `config`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn create_client(config: &GatewayConfig) -> Result<ChatCompletionsClient, reqwest::Error> {
    let client = ChatCompletionsClient::new(ChatCompletionsConfig::from_gateway_config(config))?;
    tracing::info!(
        endpoint = client.endpoint(),
        model = %config.model,
        max_retries = config.max_retries,
        timeout_secs = config.timeout_secs,
        auth = !config.api_key.is_empty(),
        "completion client ready"
    );
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use platechat_core::llm::provider::CompletionProvider;

    #[test]
    fn test_create_client_from_defaults() {
        let client = create_client(&GatewayConfig::default()).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(client.model(), "qwen-plus");
        assert_eq!(client.name(), "qwen");
        assert_eq!(client.retry_policy().max_attempts(), 4);
    }
}
