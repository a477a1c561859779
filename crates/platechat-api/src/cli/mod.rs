//! CLI command definitions for the `platechat` binary.
//!
//! Uses clap derive macros for argument parsing. Global flags override the
//! values loaded from the config file and environment.

pub mod ask;
pub mod session_id;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use platechat_infra::config::DEFAULT_CONFIG_FILE;
use platechat_types::config::GatewayConfig;

/// Chat gateway for license-plate assistants.
#[derive(Parser)]
#[command(name = "platechat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Base URL of the completion service.
    #[arg(long, global = true)]
    pub completion_url: Option<String>,

    /// Model identifier sent upstream.
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Retries after the first failed attempt.
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Per-attempt timeout in seconds.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server.
    Serve {
        /// Address to bind (overrides config).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Send one message and print the reply.
    Ask {
        /// The message to send.
        message: String,

        /// License plate as a JSON object, e.g. '{"full_text":"品川 330 あ 12-34"}'.
        #[arg(long)]
        plate: Option<String>,
    },

    /// Print a freshly generated session id.
    #[command(name = "session-id")]
    SessionId {
        #[arg(long)]
        user_id: Option<String>,

        #[arg(long)]
        device_id: Option<String>,
    },
}

impl Cli {
    /// Apply global flags on top of a loaded config.
    pub fn apply_overrides(&self, mut config: GatewayConfig) -> GatewayConfig {
        if let Some(url) = &self.completion_url {
            config.completion_url = url.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        if let Commands::Serve { host, port } = &self.command {
            if let Some(host) = host {
                config.host = host.clone();
            }
            if let Some(port) = port {
                config.port = *port;
            }
        }
        config
    }

    /// Log filter: the configured level, raised by `-v`.
    pub fn log_level(&self, configured: &str) -> String {
        match self.verbose {
            0 => configured.to_string(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "platechat",
            "--completion-url",
            "http://cli:1",
            "--max-retries",
            "0",
            "serve",
            "--port",
            "9000",
        ]);
        let config = cli.apply_overrides(GatewayConfig::default());
        assert_eq!(config.completion_url, "http://cli:1");
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::parse_from(["platechat", "session-id"]);
        let config = cli.apply_overrides(GatewayConfig::default());
        assert_eq!(config, GatewayConfig::default());
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn test_verbosity_raises_level() {
        let cli = Cli::parse_from(["platechat", "-vv", "ask", "hi"]);
        assert_eq!(cli.log_level("warn"), "trace");
        let cli = Cli::parse_from(["platechat", "ask", "hi"]);
        assert_eq!(cli.log_level("warn"), "warn");
    }
}
