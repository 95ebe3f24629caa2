//! Configuration management

use crate::error::{IamError, IamResult};
use crate::logging::LoggingConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IamConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub seed: SeedConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Storage connection string; must be supplied
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Token signing secret; must be supplied
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .finish()
    }
}

/// Bootstrap identity that receives every system permission
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub superadmin_username: String,
    pub superadmin_password: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            superadmin_username: "superadmin".to_string(),
            superadmin_password: "superadmin".to_string(),
        }
    }
}

impl std::fmt::Debug for SeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedConfig")
            .field("superadmin_username", &self.superadmin_username)
            .field("superadmin_password", &"<redacted>")
            .finish()
    }
}

impl IamConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> IamResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| IamError::Config {
            message: format!("Failed to read config file: {}", e),
        })?;

        toml::from_str(&content).map_err(|e| IamError::Config {
            message: format!("Failed to parse config: {}", e),
        })
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> IamResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| IamError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| IamError::Config {
            message: format!("Failed to write config file: {}", e),
        })
    }

    /// Overlay values found in the process environment
    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable source
    pub fn apply_vars<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("IAM_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("IAM_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(username) = lookup("IAM_SUPERADMIN_USERNAME") {
            self.seed.superadmin_username = username;
        }
        if let Some(password) = lookup("IAM_SUPERADMIN_PASSWORD") {
            self.seed.superadmin_password = password;
        }
        if let Some(level) = lookup("IAM_LOG_LEVEL") {
            self.logging.level = level;
        }
        self
    }

    /// Validate configuration. Missing secrets are fatal at startup.
    pub fn validate(&self) -> IamResult<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(IamError::Config {
                message: "A token signing secret must be set (JWT_SECRET)".to_string(),
            });
        }

        if self.database.url.trim().is_empty() {
            return Err(IamError::Config {
                message: "A database connection string must be set (DATABASE_URL)".to_string(),
            });
        }

        crate::validation::validate_username(&self.seed.superadmin_username).map_err(|e| {
            IamError::Config {
                message: format!("Invalid seed username: {}", e),
            }
        })?;
        crate::validation::validate_password(&self.seed.superadmin_password).map_err(|e| {
            IamError::Config {
                message: format!("Invalid seed password: {}", e),
            }
        })?;

        Ok(())
    }
}
