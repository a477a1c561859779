//! Session HTTP handlers.
//!
//! Endpoints:
//! - POST   /papi/sessions            - Issue an id and create its record
//! - GET    /papi/sessions/{id}       - Snapshot of a session
//! - DELETE /papi/sessions/{id}       - Delete a session
//! - POST   /papi/sessions/{id}/clear - Clear history but keep the plate

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;

use platechat_core::service::session_id::SessionIdGenerator;
use platechat_types::error::ValidationError;
use platechat_types::session::SessionSnapshot;

use crate::http::error::AppError;
use crate::http::middleware::RequestMeta;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Optional hints mixed into a new session id.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
}

/// POST /papi/sessions - Issue a fresh session id.
///
/// An empty body is accepted; a non-empty one must be a JSON object.
pub async fn create_session(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    body: Bytes,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let hints = if body.iter().all(u8::is_ascii_whitespace) {
        CreateSessionRequest::default()
    } else {
        serde_json::from_slice::<CreateSessionRequest>(&body)
            .map_err(|_| ValidationError::InvalidBody)?
    };

    let session_id = state
        .session_ids
        .generate(hints.user_id.as_deref(), hints.device_id.as_deref());
    state.store.get_or_create(&session_id);

    tracing::info!(session_id = %session_id, "session created");

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "session_id": session_id }),
        meta.request_id.clone(),
        meta.elapsed_ms(),
    )))
}

/// GET /papi/sessions/{id} - Current plate and history of a session.
pub async fn get_session(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SessionSnapshot>>, AppError> {
    let handle = state
        .store
        .get(&id)
        .ok_or_else(|| AppError::SessionNotFound(id.clone()))?;
    let snapshot = handle.lock().await.snapshot();

    Ok(Json(ApiResponse::success(snapshot, meta.request_id.clone(), meta.elapsed_ms())))
}

/// DELETE /papi/sessions/{id} - Remove a session. Deleting an unknown id
/// is not an error.
pub async fn delete_session(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let deleted = state.store.delete(&id);
    tracing::info!(session_id = %id, deleted, "session delete requested");

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": deleted }),
        meta.request_id.clone(),
        meta.elapsed_ms(),
    )))
}

/// POST /papi/sessions/{id}/clear - Drop the history, keep the plate.
pub async fn clear_session(
    State(state): State<AppState>,
    Extension(meta): Extension<RequestMeta>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let handle = state
        .store
        .get(&id)
        .ok_or_else(|| AppError::SessionNotFound(id.clone()))?;
    handle.lock().await.clear_history();

    tracing::info!(session_id = %id, "session history cleared");

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "cleared": true }),
        meta.request_id.clone(),
        meta.elapsed_ms(),
    )))
}
