//! Command-line reader for versioned catalog layers.
//!
//! Resolves service endpoints, catalog versions and partition addresses
//! against the configured environment and prints or saves the results.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use olp_client::ClientSettings;
use olp_common::{ClientConfig, Environment};

#[derive(Parser, Debug)]
#[command(name = "olp-fetch")]
#[command(about = "Read partitions of versioned catalog layers")]
struct Args {
    /// YAML configuration file (overrides OLP_* environment variables)
    #[arg(long, env = "OLP_CONFIG")]
    config: Option<PathBuf>,

    /// Platform environment name or custom lookup URL
    #[arg(long)]
    environment: Option<String>,

    /// Bearer token for platform requests
    #[arg(long, env = "OLP_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a service base URL through the API lookup service
    Lookup {
        /// Service name (metadata, query, blob, config, lookup)
        service: String,
        /// Catalog HRN for resource-scoped services
        #[arg(long)]
        hrn: Option<String>,
        #[arg(long, default_value = "v1")]
        service_version: String,
    },
    /// Print the latest version of a catalog
    LatestVersion { hrn: String },
    /// Print the configuration of a catalog layer as JSON
    Connect {
        hrn: String,
        layer: String,
        #[arg(long)]
        version: Option<u64>,
    },
    /// Print partition metadata as JSON
    Partitions {
        hrn: String,
        layer: String,
        /// Partition ids; all partitions when none are given
        #[arg(long = "id")]
        ids: Vec<String>,
        /// HERE tile id for a quad-tree index query
        #[arg(long, conflicts_with = "ids")]
        quad_key: Option<u64>,
        #[arg(long, default_value = "0")]
        depth: u32,
        #[arg(long)]
        version: Option<u64>,
        #[arg(long)]
        billing_tag: Option<String>,
    },
    /// Download partition data
    #[command(group(
        ArgGroup::new("address")
            .required(true)
            .args(["data_handle", "partition_id", "quad_key"])
    ))]
    Get {
        hrn: String,
        layer: String,
        #[arg(long)]
        data_handle: Option<String>,
        #[arg(long)]
        partition_id: Option<String>,
        /// HERE tile id
        #[arg(long)]
        quad_key: Option<u64>,
        /// Quad-tree depth searched below the tile
        #[arg(long, requires = "quad_key")]
        depth: Option<u32>,
        #[arg(long)]
        version: Option<u64>,
        #[arg(long)]
        billing_tag: Option<String>,
        /// Write the payload here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let config = load_config(&args)?;
    let settings = ClientSettings::from_config(&config).context("Invalid client configuration")?;
    info!(environment = %config.environment, "Starting olp-fetch");

    // Handle Ctrl+C
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        warn!("Received interrupt, cancelling");
        trigger.cancel();
    });

    commands::run(args.command, settings, cancel).await
}

fn load_config(args: &Args) -> Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::load_from_file(path)?,
        None => ClientConfig::from_env(),
    };

    if let Some(environment) = &args.environment {
        config.environment = environment
            .parse::<Environment>()
            .map_err(anyhow::Error::msg)
            .context("Invalid --environment")?;
    }
    if let Some(token) = &args.access_token {
        config.access_token = token.clone();
    }

    config.validate().map_err(anyhow::Error::msg)?;
    Ok(config)
}
