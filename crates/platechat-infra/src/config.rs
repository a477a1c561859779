//! Gateway configuration loader.
//!
//! Layers, later wins: built-in defaults, an optional TOML file, then
//! environment variables. CLI flags are applied on top by the binary.

use std::path::Path;

use platechat_types::config::GatewayConfig;
use platechat_types::error::ConfigError;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "platechat.toml";

pub const ENV_COMPLETION_URL: &str = "QWEN_MCP_URL";
pub const ENV_API_KEY: &str = "QWEN_API_KEY";
pub const ENV_MODEL: &str = "QWEN_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "QWEN_TIMEOUT_SECS";
pub const ENV_MAX_RETRIES: &str = "QWEN_MAX_RETRIES";
pub const ENV_HOST: &str = "PLATECHAT_HOST";
pub const ENV_PORT: &str = "PLATECHAT_PORT";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

/// Read `path` as TOML.
///
/// - Missing file: defaults.
/// - Unreadable or malformed file: error.
pub async fn load_config_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(GatewayConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    toml::from_str::<GatewayConfig>(&content).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// Overlay values found through `lookup` (normally `std::env::var`).
///
/// Empty values are ignored, except for the API key where empty means
/// "no key".
pub fn apply_env_overrides<F>(mut config: GatewayConfig, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty(ENV_COMPLETION_URL) {
        config.completion_url = url;
    }
    if let Some(key) = lookup(ENV_API_KEY) {
        config.api_key = key;
    }
    if let Some(model) = non_empty(ENV_MODEL) {
        config.model = model;
    }
    if let Some(raw) = non_empty(ENV_TIMEOUT_SECS) {
        config.timeout_secs = parse_number(ENV_TIMEOUT_SECS, &raw)?;
    }
    if let Some(raw) = non_empty(ENV_MAX_RETRIES) {
        config.max_retries = parse_number(ENV_MAX_RETRIES, &raw)?;
    }
    if let Some(host) = non_empty(ENV_HOST) {
        config.host = host;
    }
    if let Some(raw) = non_empty(ENV_PORT) {
        config.port = parse_number(ENV_PORT, &raw)?;
    }
    if let Some(level) = non_empty(ENV_LOG_LEVEL) {
        config.log_level = level.to_lowercase();
    }

    Ok(config)
}

fn parse_number<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{var} must be a non-negative integer, got '{raw}'")))
}

/// Load file and environment layers.
///
/// Validation is left to the caller so CLI overrides can be applied first.
pub async fn load_gateway_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let from_file = load_config_file(path).await?;
    apply_env_overrides(from_file, |key| std::env::var(key).ok())
}
