//! Per-request id and timing.
//!
//! `request_meta` stamps every request with a [`RequestMeta`] extension that
//! handlers read for their envelope. Error responses carry a
//! [`FailedRequest`] extension instead of a final body; the middleware
//! renders their envelope with the same request id and elapsed time, and
//! echoes the id in the `x-request-id` header.

use std::time::Instant;

use axum::Json;
use axum::extract::Request;
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::response::{ApiResponse, new_request_id};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Identity and start time of the request being handled.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub request_id: String,
    started: Instant,
}

impl RequestMeta {
    pub fn new() -> Self {
        Self {
            request_id: new_request_id(),
            started: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

impl Default for RequestMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// Code and message of a failed request, awaiting its envelope.
#[derive(Debug, Clone)]
pub struct FailedRequest {
    pub code: &'static str,
    pub message: String,
}

pub async fn request_meta(mut request: Request, next: Next) -> Response {
    let meta = RequestMeta::new();
    request.extensions_mut().insert(meta.clone());

    let mut response = next.run(request).await;

    if let Some(failed) = response.extensions_mut().remove::<FailedRequest>() {
        let envelope = ApiResponse::error(
            failed.code,
            &failed.message,
            meta.request_id.clone(),
            meta.elapsed_ms(),
        );
        let (mut parts, _) = response.into_parts();
        parts.headers.remove(header::CONTENT_LENGTH);
        response = Response::from_parts(parts, Json(envelope).into_response().into_body());
    }

    if let Ok(value) = HeaderValue::from_str(&meta.request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
