//! Chat HTTP handler.
//!
//! Endpoint:
//! - POST /papi/chat - Answer one message, optionally with plate context
//!   and/or a session id

use axum::body::Bytes;
use axum::extract::State;
use axum::{Extension, Json};

use platechat_types::chat::{ChatReply, ChatRequest};
use platechat_types::error::ValidationError;

use crate::http::error::AppError;
use crate::http::middleware::RequestMeta;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /papi/chat - Forward a message to the completion service.
///
/// The raw body is decoded here rather than through `Json<T>` so that every
/// malformed input maps onto the gateway's own error codes.
pub async fn chat(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    body: Bytes,
) -> Result<Json<ApiResponse<ChatReply>>, AppError> {
    let value: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| ValidationError::InvalidBody)?;
    let request = ChatRequest::from_json(&value)?;

    tracing::debug!(
        request_id = %meta.request_id,
        has_context = request.context.is_some(),
        session_id = request.session_id.as_deref().unwrap_or_default(),
        "chat request accepted"
    );

    let reply = state.chat_service.chat(&request).await?;

    let elapsed = meta.elapsed_ms();
    Ok(Json(ApiResponse::success(reply, meta.request_id, elapsed)))
}
