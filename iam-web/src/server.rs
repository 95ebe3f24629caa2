//! IAM Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebError, WebResult};
use axum::serve;
use iam_core::IamConfig;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main IAM web server
pub struct IamServer {
    config: IamConfig,
    state: AppState,
}

impl IamServer {
    /// Validate the configuration and prepare the store
    pub async fn new(config: IamConfig) -> WebResult<Self> {
        config.validate()?;
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.server.address();
        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!(%address, "Server listening");

        if let Err(e) = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            error!(error = %e, "Server error");
            return Err(WebError::Server(e));
        }

        info!("Server shut down");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &IamConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}

/// Builder for IamServer
pub struct IamServerBuilder {
    config: IamConfig,
}

impl IamServerBuilder {
    pub fn new() -> Self {
        Self {
            config: IamConfig::default(),
        }
    }

    /// Start from an already loaded configuration
    pub fn config(mut self, config: IamConfig) -> Self {
        self.config = config;
        self
    }

    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn database_url<S: Into<String>>(mut self, database_url: S) -> Self {
        self.config.database.url = database_url.into();
        self
    }

    pub fn jwt_secret<S: Into<String>>(mut self, secret: S) -> Self {
        self.config.auth.jwt_secret = secret.into();
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<IamServer> {
        IamServer::new(self.config).await
    }
}

impl Default for IamServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
