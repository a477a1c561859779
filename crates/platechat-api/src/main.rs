//! platechat CLI and REST API entry point.
//!
//! Binary name: `platechat`
//!
//! Loads configuration (file, environment, flags), initializes tracing, then
//! dispatches to a one-shot command or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;

use cli::{Cli, Commands};
use platechat_infra::config::load_gateway_config;
use platechat_observe::tracing_setup::{init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = cli.apply_overrides(load_gateway_config(&cli.config).await?);
    config.validate()?;

    init_tracing(&cli.log_level(&config.log_level), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli, config).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli, config: platechat_types::config::GatewayConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::SessionId { user_id, device_id } => {
            cli::session_id::print_session_id(user_id.as_deref(), device_id.as_deref(), cli.json)?;
        }

        Commands::Ask { message, plate } => {
            let state = AppState::init(config)?;
            cli::ask::ask(&state, message, plate, cli.json).await?;
        }

        Commands::Serve { .. } => {
            let addr = config.bind_addr();
            let state = AppState::init(config)?;
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} platechat listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}/papi")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
