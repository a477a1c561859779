//! OpenTelemetry GenAI Semantic Convention attribute names.
//!
//! Fields known up front are declared with their literal dotted names in
//! `tracing::info_span!`. The constants here name the fields that are
//! declared empty and filled in after the call with `Span::record`.
//!
//! Span naming convention: `"{operation} {model}"` (e.g., `"chat qwen-plus"`).

/// Finish reason of the first choice (e.g., "stop", "length").
pub const GEN_AI_RESPONSE_FINISH_REASONS: &str = "gen_ai.response.finish_reasons";

/// Stable error code when the call failed (e.g., "CONNECTION_FAILED").
pub const ERROR_CODE: &str = "error.code";

/// Standard chat completion operation.
pub const OP_CHAT: &str = "chat";

/// Build a span name following the `"{operation} {model}"` convention.
pub fn span_name(operation: &str, model: &str) -> String {
    format!("{operation} {model}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_field_names() {
        assert!(GEN_AI_RESPONSE_FINISH_REASONS.starts_with("gen_ai.response."));
        assert_eq!(ERROR_CODE, "error.code");
    }

    #[test]
    fn test_span_name() {
        assert_eq!(span_name(OP_CHAT, "qwen-plus"), "chat qwen-plus");
    }
}
