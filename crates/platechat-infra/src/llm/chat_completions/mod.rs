//! ChatCompletionsClient -- concrete [`CompletionProvider`] for services
//! speaking the OpenAI chat-completions protocol (the Qwen MCP gateway).
//!
//! Each attempt is a single `POST {base_url}/v1/chat/completions`. Every
//! outcome other than a usable 2xx body is classified into a
//! [`CompletionError`] before the retry decision is made.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

pub mod config;
pub mod types;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::Instrument;

use platechat_core::llm::provider::CompletionProvider;
use platechat_core::llm::retry::{RetryPolicy, retry_with_backoff};
use platechat_observe::genai_attrs::{self, ERROR_CODE, GEN_AI_RESPONSE_FINISH_REASONS, OP_CHAT};
use platechat_types::llm::{
    CompletionError, CompletionResponse, ErrorDetails, FinishReason, Message,
};

use self::config::{COMPLETIONS_PATH, ChatCompletionsConfig};
use self::types::{ChatCompletionRequest, ChatCompletionResponse, WireMessage};

/// HTTP client for a chat-completions endpoint with built-in retry.
///
/// Holds no mutable state; one instance is shared by all requests.
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
    provider_name: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    timeout: Duration,
    retry: RetryPolicy,
}

// No Debug: holds the API key.

impl ChatCompletionsClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be created
    /// (e.g., no TLS backend is available).
    pub fn new(config: ChatCompletionsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let base_url = config.base_url.trim_end_matches('/');

        Ok(Self {
            client,
            api_key: config.api_key,
            endpoint: format!("{base_url}{COMPLETIONS_PATH}"),
            provider_name: config.provider_name,
            model: config.model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: config.timeout,
            retry: config.retry,
        })
    }

    /// Full URL every attempt is posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    fn details(&self) -> ErrorDetails {
        ErrorDetails::endpoint(self.endpoint.clone())
    }

    /// One request/response exchange, classified.
    async fn send_once(&self, messages: &[Message]) -> Result<CompletionResponse, CompletionError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role,
                    content: &m.content,
                })
                .collect(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        let key = self.api_key.expose_secret();
        if !key.is_empty() {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), body = %error_body, "completion service returned error status");
            return Err(classify_status(status.as_u16(), self.details()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.classify_transport(e))?;
        let parsed: ChatCompletionResponse = serde_json::from_slice(&bytes).map_err(|e| {
            CompletionError::invalid_response(
                format!("failed to parse response: {e}"),
                self.details().with_status(status.as_u16()),
            )
        })?;

        let Some(choice) = parsed.choices.and_then(|c| c.into_iter().next()) else {
            return Err(CompletionError::invalid_response(
                "response contained no choices",
                self.details().with_status(status.as_u16()),
            ));
        };

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            finish_reason: choice
                .finish_reason
                .as_deref()
                .map(FinishReason::from)
                .unwrap_or_default(),
            usage: parsed.usage,
        })
    }

    /// Map a transport-level failure. Timeouts are checked first so a
    /// connect timeout reports as `Timeout`.
    fn classify_transport(&self, err: reqwest::Error) -> CompletionError {
        if err.is_timeout() {
            let secs = self.timeout.as_secs();
            CompletionError::timeout(
                format!("request timed out after {secs}s: {err}"),
                self.details().with_timeout(secs),
            )
        } else if err.is_connect() {
            CompletionError::connection_failed(
                format!("cannot connect to completion service: {err}"),
                self.details(),
            )
        } else {
            CompletionError::connection_failed(format!("HTTP error: {err}"), self.details())
        }
    }
}

/// Map a non-success HTTP status.
fn classify_status(status: u16, details: ErrorDetails) -> CompletionError {
    let details = details.with_status(status);
    match status {
        401 => CompletionError::Unauthorized { details },
        429 => CompletionError::RateLimited { details },
        s if s >= 500 => CompletionError::connection_failed(format!("server error: {s}"), details),
        s => CompletionError::Api { status: s, details },
    }
}

impl CompletionProvider for ChatCompletionsClient {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, messages: &[Message]) -> Result<CompletionResponse, CompletionError> {
        let span = tracing::info_span!(
            "chat",
            otel.name = %genai_attrs::span_name(OP_CHAT, &self.model),
            gen_ai.operation.name = OP_CHAT,
            gen_ai.provider.name = %self.provider_name,
            gen_ai.request.model = %self.model,
            gen_ai.request.temperature = self.temperature,
            gen_ai.request.max_tokens = self.max_tokens,
            gen_ai.response.finish_reasons = tracing::field::Empty,
            error.code = tracing::field::Empty,
        );

        let result = retry_with_backoff(&self.retry, |attempt| {
            tracing::debug!(
                attempt,
                max_attempts = self.retry.max_attempts(),
                endpoint = %self.endpoint,
                messages = messages.len(),
                "sending chat completion request"
            );
            self.send_once(messages)
        })
        .instrument(span.clone())
        .await;

        match &result {
            Ok(response) => {
                span.record(
                    GEN_AI_RESPONSE_FINISH_REASONS,
                    tracing::field::display(&response.finish_reason),
                );
            }
            Err(err) => {
                span.record(ERROR_CODE, err.code());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platechat_types::llm::MessageRole;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            ..RetryPolicy::default()
        }
    }

    fn client_for(server: &MockServer, api_key: &str) -> ChatCompletionsClient {
        let config = ChatCompletionsConfig::new(server.uri(), SecretString::from(api_key))
            .with_retry(fast_retry());
        ChatCompletionsClient::new(config).unwrap()
    }

    fn hello() -> Vec<Message> {
        vec![Message::system("be brief"), Message::user("こんにちは")]
    }

    fn ok_body(content: &str) -> serde_json::Value {
        json!({
            "choices": [{
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
        })
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let config = ChatCompletionsConfig::new("http://localhost:8080/", SecretString::from(""));
        let client = ChatCompletionsClient::new(config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_classify_status() {
        let d = ErrorDetails::endpoint("http://x/v1/chat/completions");
        assert_eq!(classify_status(401, d.clone()).code(), "UNAUTHORIZED");
        assert_eq!(classify_status(429, d.clone()).code(), "RATE_LIMITED");
        assert_eq!(classify_status(500, d.clone()).code(), "CONNECTION_FAILED");
        assert_eq!(classify_status(503, d.clone()).details().status_code, Some(503));
        assert_eq!(classify_status(404, d.clone()).code(), "API_ERROR");
        assert_eq!(classify_status(400, d).to_string(), "API error: 400");
    }

    #[tokio::test]
    async fn test_success_sends_expected_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "qwen-plus",
                "temperature": 0.7,
                "max_tokens": 2048,
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "こんにちは"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("こんにちは！")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, "sk-test");
        let response = client.chat(&hello()).await.unwrap();
        assert_eq!(response.content, "こんにちは！");
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.usage.unwrap()["total_tokens"], 17);
    }

    #[tokio::test]
    async fn test_no_authorization_header_without_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("ok")))
            .mount(&server)
            .await;

        client_for(&server, "").chat(&hello()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server, "bad").chat(&hello()).await.unwrap_err();
        assert_eq!(err.code(), "UNAUTHORIZED");
        assert_eq!(err.details().status_code, Some(401));
    }

    #[tokio::test]
    async fn test_rate_limited_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server, "").chat(&hello()).await.unwrap_err();
        assert_eq!(err.code(), "RATE_LIMITED");
    }

    #[tokio::test]
    async fn test_bad_request_is_api_error_after_one_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server, "").chat(&hello()).await.unwrap_err();
        assert_eq!(err, CompletionError::Api {
            status: 400,
            details: ErrorDetails::endpoint(format!("{}/v1/chat/completions", server.uri()))
                .with_status(400),
        });
    }

    #[tokio::test]
    async fn test_server_error_exhausts_all_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(4)
            .mount(&server)
            .await;

        let err = client_for(&server, "").chat(&hello()).await.unwrap_err();
        assert_eq!(err.code(), "CONNECTION_FAILED");
        assert_eq!(err.details().status_code, Some(503));
    }

    #[tokio::test]
    async fn test_server_error_then_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("recovered")))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server, "").chat(&hello()).await.unwrap();
        assert_eq!(response.content, "recovered");
    }

    #[tokio::test]
    async fn test_empty_choices_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server, "").chat(&hello()).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_RESPONSE");
    }

    #[tokio::test]
    async fn test_non_json_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server, "").chat(&hello()).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_RESPONSE");
    }

    #[tokio::test]
    async fn test_missing_content_and_unknown_finish_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant"}, "finish_reason": "eos"}]
            })))
            .mount(&server)
            .await;

        let response = client_for(&server, "").chat(&hello()).await.unwrap();
        assert_eq!(response.content, "");
        assert_eq!(response.finish_reason, FinishReason::Other("eos".into()));
        assert!(response.usage.is_none());
    }

    #[tokio::test]
    async fn test_timeout_is_retried_then_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(ok_body("late"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let config = ChatCompletionsConfig::new(server.uri(), SecretString::from(""))
            .with_timeout(Duration::from_millis(50))
            .with_retry(RetryPolicy {
                max_retries: 1,
                ..fast_retry()
            });
        let client = ChatCompletionsClient::new(config).unwrap();

        let err = client.chat(&hello()).await.unwrap_err();
        assert_eq!(err.code(), "TIMEOUT");
        assert!(err.details().timeout_secs.is_some());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_connection_failed() {
        // Port 9 (discard) is not expected to be listening locally.
        let config = ChatCompletionsConfig::new("http://127.0.0.1:9", SecretString::from(""))
            .with_retry(RetryPolicy {
                max_retries: 0,
                ..fast_retry()
            });
        let client = ChatCompletionsClient::new(config).unwrap();

        let err = client.chat(&[Message::new(MessageRole::User, "hi")]).await.unwrap_err();
        assert_eq!(err.code(), "CONNECTION_FAILED");
        assert_eq!(
            err.details().endpoint.as_deref(),
            Some("http://127.0.0.1:9/v1/chat/completions")
        );
    }
}
