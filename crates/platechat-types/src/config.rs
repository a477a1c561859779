//! Gateway configuration types for platechat.
//!
//! `GatewayConfig` is the single configuration record consumed at startup.
//! It can be read from a TOML file; every field has a default so a partial
//! (or empty) file is valid.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration for the gateway process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the remote chat-completion service.
    #[serde(default = "default_completion_url")]
    pub completion_url: String,

    /// Bearer token for the completion service. Empty means no auth header.
    #[serde(default)]
    pub api_key: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-attempt request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Additional attempts after the first failed one.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Default log filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_completion_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_model() -> String {
    "qwen-plus".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            completion_url: default_completion_url(),
            api_key: String::new(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

impl GatewayConfig {
    /// Check values that serde cannot constrain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.completion_url.starts_with("http://")
            || self.completion_url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(format!(
                "completion_url must be an http(s) URL, got '{}'",
                self.completion_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be positive".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".to_string()));
        }
        Ok(())
    }

    /// `host:port` listen address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
