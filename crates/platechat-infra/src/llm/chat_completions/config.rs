//! Configuration for the chat-completions client.
//!
//! The remote service speaks the OpenAI chat-completions protocol at
//! `{base_url}/v1/chat/completions`. Sampling parameters are fixed per
//! client; model, timeout and retry count come from the gateway config.

use std::time::Duration;

use secrecy::SecretString;

use platechat_core::llm::retry::RetryPolicy;
use platechat_types::config::GatewayConfig;

pub const COMPLETIONS_PATH: &str = "/v1/chat/completions";

pub const DEFAULT_MODEL: &str = "qwen-plus";

pub const DEFAULT_TEMPERATURE: f64 = 0.7;

pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Per-attempt request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a [`super::ChatCompletionsClient`].
pub struct ChatCompletionsConfig {
    /// Name reported in logs and spans.
    pub provider_name: String,
    /// Service root, without the completions path. A trailing `/` is dropped.
    pub base_url: String,
    /// Bearer token. Empty means no `Authorization` header.
    pub api_key: SecretString,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl ChatCompletionsConfig {
    /// Defaults for everything except the endpoint and key.
    pub fn new(base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            provider_name: "qwen".to_string(),
            base_url: base_url.into(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_gateway_config(config: &GatewayConfig) -> Self {
        Self {
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            retry: RetryPolicy::with_max_retries(config.max_retries),
            ..Self::new(
                config.completion_url.clone(),
                SecretString::from(config.api_key.clone()),
            )
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
