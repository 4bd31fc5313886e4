//! Configuration file parsing for the server.
//!
//! Loads settings from TOML files including listen address, ports, the
//! active revision and allowed CORS origins. Every field has a default, so
//! an empty file (or no file) is a valid configuration.

use contour_domain::Revision;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// An environment override could not be parsed
    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for both listeners (e.g., "127.0.0.1")
    pub bind_address: String,

    /// REST + GraphQL port
    pub http_port: u16,

    /// gRPC port (baseline revision only)
    pub grpc_port: u16,

    /// Schema revision to serve
    pub revision: Revision,

    /// Origins allowed by CORS, credentials included
    pub cors_origins: Vec<String>,

    /// Default tracing filter, used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            http_port: 3000,
            grpc_port: 50051,
            revision: Revision::Baseline,
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
            log_filter: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply `PORT`, `GRPC_PORT` and `CONTOUR_REVISION` from the environment
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("PORT") {
            self.http_port = parse_port("PORT", value)?;
        }

        if let Some(value) = lookup("GRPC_PORT") {
            self.grpc_port = parse_port("GRPC_PORT", value)?;
        }

        if let Some(value) = lookup("CONTOUR_REVISION") {
            self.revision = Revision::parse(&value).ok_or(ConfigError::InvalidEnv {
                name: "CONTOUR_REVISION",
                value,
            })?;
        }

        Ok(self)
    }

    /// Get the HTTP bind address (address:port)
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.http_port)
    }

    /// gRPC listener settings
    pub fn grpc_config(&self) -> contour_grpc::ServerConfig {
        contour_grpc::ServerConfig::new(self.bind_address.clone(), self.grpc_port)
    }
}

fn parse_port(name: &'static str, value: String) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}
