//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use platechat_types::error::ValidationError;
use platechat_types::llm::CompletionError;

use super::middleware::FailedRequest;
use super::response::{ApiResponse, new_request_id};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or invalid request input.
    Validation(ValidationError),
    /// The remote completion call failed.
    Completion(CompletionError),
    SessionNotFound(String),
    /// Unexpected failure. Details are logged, never returned.
    Internal(String),
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e)
    }
}

impl From<CompletionError> for AppError {
    fn from(e: CompletionError) -> Self {
        AppError::Completion(e)
    }
}

/// HTTP status for a stable error code.
pub fn status_for_code(code: &str) -> StatusCode {
    match code {
        "CONNECTION_FAILED" => StatusCode::SERVICE_UNAVAILABLE,
        "TIMEOUT" => StatusCode::GATEWAY_TIMEOUT,
        "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
        "RATE_LIMITED" => StatusCode::TOO_MANY_REQUESTS,
        "INVALID_REQUEST" => StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR" => StatusCode::UNPROCESSABLE_ENTITY,
        "SESSION_NOT_FOUND" => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(e) => e.code(),
            AppError::Completion(e) => e.code(),
            AppError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::Completion(e) => e.to_string(),
            AppError::SessionNotFound(id) => format!("session '{id}' not found"),
            AppError::Internal(_) => "an internal error occurred".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status = status_for_code(code);

        match &self {
            AppError::Completion(e) => {
                tracing::error!(
                    code,
                    error = %e,
                    endpoint = e.details().endpoint.as_deref().unwrap_or_default(),
                    status_code = ?e.details().status_code,
                    "completion request failed"
                );
            }
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "unexpected error while handling request");
            }
            _ => {
                tracing::debug!(code, error = %self.message(), "request rejected");
            }
        }

        // `request_meta` re-renders this envelope with the request's id and timing.
        let message = self.message();
        let body = ApiResponse::error(code, &message, new_request_id(), 0);
        let mut response = (status, Json(body)).into_response();
        response
            .extensions_mut()
            .insert(FailedRequest { code, message });
        response
    }
}
