//! IAM Web Server
//!
//! Identity and access management over HTTP.

use anyhow::Context;
use clap::Parser;
use iam_web::{init_logging, IamConfig, IamServer};
use std::path::PathBuf;
use tracing::info;

/// IAM Web Server - token authentication and permission grants
#[derive(Parser, Debug)]
#[command(name = "iam-web")]
#[command(about = "Identity and access management backend")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Database URL (`sqlite://...`, `sqlite::memory:` or `memory`)
    #[arg(long)]
    database_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    /// Defaults < file < environment < flags
    fn load_config(&self) -> anyhow::Result<IamConfig> {
        let base = match &self.config {
            Some(path) => IamConfig::from_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => IamConfig::default(),
        };

        let mut config = base.apply_env();
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = args.load_config()?;
    init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    config.validate().context("Invalid configuration")?;
    info!(address = %config.server.address(), "Starting IAM web server");

    let server = IamServer::new(config)
        .await
        .context("Failed to build server")?;
    server.start().await.context("Server failed")?;

    Ok(())
}
