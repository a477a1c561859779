//! Chat service orchestrating prompt assembly, session context and the
//! remote completion call.
//!
//! Generic over `CompletionProvider` so platechat-core never depends on
//! platechat-infra.

use std::sync::Arc;

use platechat_types::chat::{ChatReply, ChatRequest};
use platechat_types::llm::{CompletionError, MessageRole};
use platechat_types::session::LicensePlate;

use super::prompt::{PromptAssembler, PromptContext};
use super::store::{ContextStore, SessionHandle};
use crate::llm::provider::CompletionProvider;

pub struct ChatService<P: CompletionProvider> {
    provider: P,
    store: Arc<ContextStore>,
}

impl<P: CompletionProvider> ChatService<P> {
    pub fn new(provider: P, store: Arc<ContextStore>) -> Self {
        Self { provider, store }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &Arc<ContextStore> {
        &self.store
    }

    /// Answer one chat message.
    ///
    /// With a `session_id`, request context is merged with the stored
    /// session: the request's plate replaces the stored one, and stored
    /// plate/history fill in whatever the request omits. The exchange is
    /// appended to the session only when the remote call succeeds.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, CompletionError> {
        let mut prompt_ctx = request
            .context
            .as_ref()
            .map(PromptContext::from_chat_context)
            .unwrap_or_default();
        let mut context_used = request.context.is_some();

        let session = match request.session_id.as_deref() {
            Some(session_id) => {
                let handle = self.store.get_or_create(session_id);
                if self.merge_session(&handle, request, &mut prompt_ctx).await {
                    context_used = true;
                }
                Some((session_id, handle))
            }
            None => None,
        };

        let messages = PromptAssembler::build_messages(&request.message, Some(&prompt_ctx));
        let response = self.provider.chat(&messages).await?;

        if let Some((session_id, before)) = session {
            self.record_turn(session_id, &before, request, &response.content)
                .await;
        }

        tracing::info!(
            provider = self.provider.name(),
            message_chars = request.message.chars().count(),
            context_used,
            session = request.session_id.is_some(),
            "chat request completed"
        );

        Ok(ChatReply {
            response: response.content,
            context_used,
        })
    }

    /// Fold stored session state into `prompt_ctx`.
    ///
    /// Returns whether the session contributed a plate or history. The
    /// record is marked active and its lock is released on return.
    async fn merge_session(
        &self,
        handle: &SessionHandle,
        request: &ChatRequest,
        prompt_ctx: &mut PromptContext,
    ) -> bool {
        let mut ctx = handle.lock().await;
        ctx.touch();
        let mut contributed = false;

        match request_plate(request) {
            Some(plate) => ctx.set_license_plate(plate),
            None => {
                if let Some(stored) = ctx.license_plate.clone() {
                    prompt_ctx.license_plate = Some(stored);
                    contributed = true;
                }
            }
        }

        let request_has_history = request
            .context
            .as_ref()
            .is_some_and(|c| !c.conversation_history.is_empty());
        if !request_has_history && !ctx.messages.is_empty() {
            prompt_ctx.prior_messages = ctx.messages_for_api();
            contributed = true;
        }

        contributed
    }

    /// Append the user and assistant turns to the live record.
    ///
    /// The record is looked up again because an expiry sweep may have
    /// removed it while the remote call was running. A replacement record
    /// gets the request's plate.
    async fn record_turn(
        &self,
        session_id: &str,
        before: &SessionHandle,
        request: &ChatRequest,
        answer: &str,
    ) {
        let handle = self.store.get_or_create(session_id);
        let mut ctx = handle.lock().await;
        if !Arc::ptr_eq(before, &handle) {
            tracing::debug!(session_id, "session expired during the call, recording into a new one");
            if let Some(plate) = request_plate(request) {
                ctx.set_license_plate(plate);
            }
        }
        ctx.add_message(MessageRole::User, request.message.clone());
        ctx.add_message(MessageRole::Assistant, answer);
    }
}

/// The request's plate, unless it is absent or carries no fields.
fn request_plate(request: &ChatRequest) -> Option<LicensePlate> {
    request
        .context
        .as_ref()
        .and_then(|c| c.license_plate.clone())
        .filter(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use platechat_types::chat::{ChatContext, HistoryEntry};
    use platechat_types::llm::{CompletionResponse, ErrorDetails, FinishReason, Message};
    use platechat_types::session::LicensePlate;
    use std::future::Future;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records every message list it receives and replies with a fixed result.
    struct MockProvider {
        reply: Result<String, CompletionError>,
        calls: Mutex<Vec<Vec<Message>>>,
        delay: Duration,
    }

    impl MockProvider {
        fn ok(content: &str) -> Self {
            Self {
                reply: Ok(content.to_string()),
                calls: Mutex::new(Vec::new()),
                delay: Duration::ZERO,
            }
        }

        fn slow(content: &str, delay: Duration) -> Self {
            Self {
                delay,
                ..Self::ok(content)
            }
        }

        fn failing(err: CompletionError) -> Self {
            Self {
                reply: Err(err),
                calls: Mutex::new(Vec::new()),
                delay: Duration::ZERO,
            }
        }

        fn last_call(&self) -> Vec<Message> {
            self.calls.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    impl CompletionProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-model"
        }

        fn chat(
            &self,
            messages: &[Message],
        ) -> impl Future<Output = Result<CompletionResponse, CompletionError>> + Send {
            self.calls.lock().unwrap().push(messages.to_vec());
            let result = self.reply.clone().map(|content| CompletionResponse {
                content,
                finish_reason: FinishReason::Stop,
                usage: None,
            });
            let delay = self.delay;
            async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
        }
    }

    fn plate() -> LicensePlate {
        LicensePlate {
            region: Some("品川".into()),
            full_text: Some("品川330あ1234".into()),
            confidence: Some(95.5),
            ..Default::default()
        }
    }

    fn service(provider: MockProvider) -> ChatService<MockProvider> {
        ChatService::new(provider, Arc::new(ContextStore::new()))
    }

    #[tokio::test]
    async fn plain_message_without_context() {
        let svc = service(MockProvider::ok("こんにちは！"));
        let reply = svc.chat(&ChatRequest::new("こんにちは").unwrap()).await.unwrap();

        assert_eq!(reply.response, "こんにちは！");
        assert!(!reply.context_used);
        let sent = svc.provider().last_call();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].role, MessageRole::System);
        assert_eq!(sent[1], Message::user("こんにちは"));
    }

    #[tokio::test]
    async fn plate_context_reaches_system_prompt() {
        let svc = service(MockProvider::ok("品川ナンバーです"));
        let request = ChatRequest::new("このナンバーは？").unwrap().with_context(ChatContext {
            license_plate: Some(plate()),
            conversation_history: vec![],
        });
        let reply = svc.chat(&request).await.unwrap();

        assert!(reply.context_used);
        let sent = svc.provider().last_call();
        assert!(sent[0].content.contains("品川330あ1234"));
    }

    #[tokio::test]
    async fn error_propagates_unchanged() {
        let err = CompletionError::connection_failed(
            "server error: 503",
            ErrorDetails::default().with_status(503),
        );
        let svc = service(MockProvider::failing(err.clone()));
        let result = svc.chat(&ChatRequest::new("hi").unwrap()).await;
        assert_eq!(result.unwrap_err(), err);
    }

    #[tokio::test]
    async fn session_accumulates_history_and_plate() {
        let svc = service(MockProvider::ok("answer"));

        let first = ChatRequest::new("first").unwrap().with_session("s1").with_context(ChatContext {
            license_plate: Some(plate()),
            conversation_history: vec![],
        });
        svc.chat(&first).await.unwrap();

        let second = ChatRequest::new("second").unwrap().with_session("s1");
        let reply = svc.chat(&second).await.unwrap();
        assert!(reply.context_used);

        let sent = svc.provider().last_call();
        assert!(sent[0].content.contains("品川330あ1234"));
        assert_eq!(sent[1], Message::user("first"));
        assert_eq!(sent[2], Message::assistant("answer"));
        assert_eq!(sent[3], Message::user("second"));

        let handle = svc.store().get("s1").unwrap();
        assert_eq!(handle.lock().await.messages.len(), 4);
    }

    #[tokio::test]
    async fn request_history_overrides_stored_history() {
        let svc = service(MockProvider::ok("answer"));
        svc.chat(&ChatRequest::new("stored").unwrap().with_session("s1"))
            .await
            .unwrap();

        let request = ChatRequest::new("now").unwrap().with_session("s1").with_context(ChatContext {
            license_plate: None,
            conversation_history: vec![HistoryEntry {
                role: Some("assistant".into()),
                content: Some("supplied".into()),
            }],
        });
        svc.chat(&request).await.unwrap();

        let sent = svc.provider().last_call();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[1], Message::assistant("supplied"));
    }

    #[tokio::test]
    async fn failed_call_leaves_session_unchanged() {
        let svc = service(MockProvider::failing(CompletionError::Unauthorized {
            details: ErrorDetails::default().with_status(401),
        }));
        let result = svc.chat(&ChatRequest::new("hi").unwrap().with_session("s1")).await;
        assert_eq!(result.unwrap_err().code(), "UNAUTHORIZED");

        let handle = svc.store().get("s1").unwrap();
        assert!(handle.lock().await.messages.is_empty());
    }

    #[tokio::test]
    async fn new_empty_session_does_not_mark_context_used() {
        let svc = service(MockProvider::ok("answer"));
        let reply = svc
            .chat(&ChatRequest::new("hi").unwrap().with_session("fresh"))
            .await
            .unwrap();
        assert!(!reply.context_used);
    }

    fn plated_request(message: &str, session_id: &str) -> ChatRequest {
        ChatRequest::new(message)
            .unwrap()
            .with_session(session_id)
            .with_context(ChatContext {
                license_plate: Some(plate()),
                conversation_history: vec![],
            })
    }

    #[tokio::test]
    async fn session_is_refreshed_when_turn_starts() {
        let store = Arc::new(ContextStore::with_timeout(Duration::from_millis(400)));
        let svc = ChatService::new(
            MockProvider::slow("answer", Duration::from_millis(300)),
            Arc::clone(&store),
        );
        let handle = store.get_or_create("s1");
        handle.lock().await.updated_at = chrono::Utc::now() - chrono::Duration::milliseconds(200);

        let request = ChatRequest::new("hi").unwrap().with_session("s1");
        let (reply, _) = tokio::join!(svc.chat(&request), async {
            tokio::time::sleep(Duration::from_millis(250)).await;
            store.get("other")
        });
        assert!(reply.is_ok());

        let after = store.get("s1").expect("session kept through the call");
        assert!(Arc::ptr_eq(&handle, &after));
        assert_eq!(after.lock().await.messages.len(), 2);
    }

    #[tokio::test]
    async fn turn_is_recorded_when_session_expires_mid_call() {
        let store = Arc::new(ContextStore::with_timeout(Duration::from_millis(100)));
        let svc = ChatService::new(
            MockProvider::slow("answer", Duration::from_millis(300)),
            Arc::clone(&store),
        );
        let handle = store.get_or_create("s1");

        let request = plated_request("hi", "s1");
        let (reply, swept) = tokio::join!(svc.chat(&request), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            store.get("s1")
        });
        assert!(reply.is_ok());
        assert!(swept.is_none());

        let after = store.get("s1").expect("turn recorded into a live session");
        assert!(!Arc::ptr_eq(&handle, &after));
        let ctx = after.lock().await;
        assert_eq!(ctx.messages.len(), 2);
        assert_eq!(ctx.messages[0].content, "hi");
        assert_eq!(ctx.messages[1].content, "answer");
        assert_eq!(ctx.license_plate, Some(plate()));
    }
}
