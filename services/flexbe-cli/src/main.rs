//! Flexbe command-line client
//!
//! Thin binary over `flexbe-client`:
//! 1. Loads configuration (file, then environment)
//! 2. Builds a client for the configured auth mode
//! 3. Runs one command and prints JSON to stdout
//!
//! Logs go to stderr as JSON, filtered by LOG_LEVEL or RUST_LOG.

mod cli;
mod metrics;

use anyhow::{Context, Result};
use flexbe_client::types::PageQuery;
use flexbe_client::{ClientConfig, FlexbeClient};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Command;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = cli::parse(&args)?;

    let prometheus = if cli.metrics {
        Some(metrics::install_recorder()?)
    } else {
        None
    };

    let config = load_config(cli.config.as_deref())?;
    let client = FlexbeClient::builder(config)
        .on_unauthorized(|err| warn!(error = %err, "not authorized, log in again"))
        .build()
        .await
        .context("failed to build client")?;

    let outcome = run(&client, cli.command).await;

    if let Some(handle) = prometheus {
        eprintln!("{}", handle.render());
    }
    outcome
}

fn load_config(cli_path: Option<&str>) -> Result<ClientConfig> {
    let path = ClientConfig::resolve_path(cli_path);
    if path.exists() {
        info!(path = %path.display(), "loading configuration");
        return ClientConfig::load(&path)
            .with_context(|| format!("failed to load config from {}", path.display()));
    }
    if cli_path.is_some() {
        anyhow::bail!("config file not found: {}", path.display());
    }
    ClientConfig::from_env().context("invalid configuration from environment")
}

async fn run(client: &FlexbeClient, command: Command) -> Result<()> {
    match command {
        Command::Languages { user: false } => print(&client.meta().site_languages().await?),
        Command::Languages { user: true } => print(&client.meta().user_languages().await?),
        Command::Currencies => print(&client.meta().site_currencies().await?),
        Command::Pages { site_id, limit } => {
            let query = PageQuery {
                limit,
                ..PageQuery::default()
            };
            print(&client.site(site_id).pages().list(&query).await?)
        }
        Command::Page { site_id, page_id } => {
            print(&client.site(site_id).pages().get(page_id).await?)
        }
        Command::Token => {
            let tokens = client
                .tokens()
                .context("token command needs auth_mode = \"bearer\"")?;
            let credential = tokens.get_credential().await?;
            print(&TokenStatus {
                state: tokens.state().label(),
                expires_at: credential.as_ref().map(|c| c.expires_at),
                remaining_secs: credential.as_ref().map(|c| c.remaining().as_secs()),
            })
        }
        Command::Revoke => {
            client.revoke_token().await;
            info!("session revoked");
            Ok(())
        }
    }
}

/// Session summary; the token itself is never printed.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenStatus {
    state: &'static str,
    expires_at: Option<u64>,
    remaining_secs: Option<u64>,
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
