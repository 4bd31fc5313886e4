//! gRPC server configuration and lifecycle management
//!
//! Handles server initialization and graceful shutdown.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use contour_domain::traits::RowStore;
use thiserror::Error;
use tonic::transport::Server;

use crate::proto::user_service_server::UserServiceServer;
use crate::service::UserServiceImpl;

/// Errors raised while running the gRPC listener
#[derive(Error, Debug)]
pub enum ServeError {
    /// Listen address could not be parsed
    #[error("Invalid gRPC address {address}: {source}")]
    InvalidAddress {
        /// Address as configured
        address: String,
        /// Parse failure
        source: std::net::AddrParseError,
    },

    /// Transport failure while binding or serving
    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server listen address
    pub addr: String,

    /// Server port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1".to_string(),
            port: 50051,
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(addr: impl Into<String>, port: u16) -> Self {
        Self {
            addr: addr.into(),
            port,
        }
    }

    /// Get the full server address
    pub fn full_address(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }

    /// Parse the full server address
    pub fn socket_addr(&self) -> Result<SocketAddr, ServeError> {
        let address = self.full_address();
        address
            .parse()
            .map_err(|source| ServeError::InvalidAddress { address, source })
    }
}

/// Start the gRPC server and run it until `shutdown` resolves
///
/// # Errors
/// Returns error if server fails to start or bind to address
pub async fn start_server<S, F>(
    config: ServerConfig,
    store: Arc<Mutex<S>>,
    shutdown: F,
) -> Result<(), ServeError>
where
    S: RowStore + Send + 'static,
    F: Future<Output = ()> + Send,
{
    let addr = config.socket_addr()?;

    let service = UserServiceImpl::new(store);
    let service_server = UserServiceServer::new(service);

    tracing::info!("gRPC server listening on {}", addr);

    Server::builder()
        .add_service(service_server)
        .serve_with_shutdown(addr, shutdown)
        .await?;

    tracing::info!("gRPC server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.addr, "127.0.0.1");
        assert_eq!(config.port, 50051);
    }

    #[test]
    fn test_full_address() {
        let config = ServerConfig::new("localhost", 8080);
        assert_eq!(config.full_address(), "localhost:8080");
    }

    #[test]
    fn test_socket_addr() {
        assert!(ServerConfig::new("0.0.0.0", 50052).socket_addr().is_ok());

        let err = ServerConfig::new("not an ip", 1).socket_addr().unwrap_err();
        assert!(err.to_string().starts_with("Invalid gRPC address not an ip:1"));
    }
}
