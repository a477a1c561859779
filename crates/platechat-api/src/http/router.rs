//! Axum router configuration with middleware.
//!
//! All routes are under `/papi/`.
//! Middleware: CORS, tracing, panic-to-500, request id and timing.

use std::any::Any as PanicPayload;

use axum::Router;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::error::AppError;
use crate::http::handlers;
use crate::http::middleware::request_meta;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/chat", post(handlers::chat::chat))
        // Sessions
        .route("/sessions", post(handlers::session::create_session))
        .route(
            "/sessions/{id}",
            get(handlers::session::get_session).delete(handlers::session::delete_session),
        )
        .route(
            "/sessions/{id}/clear",
            post(handlers::session::clear_session),
        );

    Router::new()
        .nest("/papi", api_routes)
        .layer(cors)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(axum::middleware::from_fn(request_meta))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A panicking handler becomes a generic `INTERNAL_ERROR` envelope.
fn panic_response(payload: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    AppError::Internal(detail).into_response()
}

/// GET /papi/health - Liveness probe, not wrapped in the envelope.
async fn health_check(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "service": "chat-api",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.config.model,
        "active_sessions": state.store.len(),
    }))
}
