//! Observability for platechat: subscriber setup and the attribute names
//! used on completion-call spans.

pub mod genai_attrs;
pub mod tracing_setup;
