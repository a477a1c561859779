//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! `ChatService` is generic over the completion provider; AppState pins it to
//! the HTTP client from `platechat-infra`.

use std::sync::Arc;

use platechat_core::chat::service::ChatService;
use platechat_core::chat::store::ContextStore;
use platechat_infra::crypto::session_id::Sha256SessionIdGenerator;
use platechat_infra::llm::chat_completions::ChatCompletionsClient;
use platechat_infra::llm::create_client;
use platechat_types::config::GatewayConfig;

pub type ConcreteChatService = ChatService<ChatCompletionsClient>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub store: Arc<ContextStore>,
    pub session_ids: Arc<Sha256SessionIdGenerator>,
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    /// Build the completion client from `config` and wire the services.
    pub fn init(config: GatewayConfig) -> anyhow::Result<Self> {
        let client = create_client(&config)?;
        Ok(Self::from_parts(client, config))
    }

    /// Wire state around an already-built client.
    pub fn from_parts(client: ChatCompletionsClient, config: GatewayConfig) -> Self {
        let store = Arc::new(ContextStore::new());
        let chat_service = Arc::new(ChatService::new(client, Arc::clone(&store)));

        Self {
            chat_service,
            store,
            session_ids: Arc::new(Sha256SessionIdGenerator::new()),
            config: Arc::new(config),
        }
    }
}
