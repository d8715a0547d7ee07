//! Rentmap CLI
//!
//! Command-line interface and server entry point.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use rentmap_cli::config_handlers::handle_config_command;
use rentmap_cli::{Cli, Command, RentmapConfig, load_index, run_query, serve};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rentmap=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Config { action } => {
            handle_config_command(cli.config.as_deref(), action)?;
        }
        Command::Serve { host, port } => {
            let mut config = resolve_config(cli.config.as_deref(), cli.data_root)?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let loaded = load_index(&config).await.inspect_err(|e| {
                tracing::error!("Startup failed: {e}");
            })?;
            serve(&config, loaded).await?;
        }
        Command::Query(query) => {
            let config = resolve_config(cli.config.as_deref(), cli.data_root)?;
            let loaded = load_index(&config).await?;
            let value = run_query(&loaded, &query)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

/// Load the config file and apply the `--data-root` override.
fn resolve_config(config_path: Option<&str>, data_root: Option<String>) -> Result<RentmapConfig> {
    let mut config = RentmapConfig::load(config_path)?;
    if let Some(root) = data_root {
        config = config.with_data_root(root);
        config.validate()?;
    }
    Ok(config)
}
