//! Contour Server
//!
//! Process wiring: opens the in-memory store, serves REST + GraphQL over
//! axum and (for the baseline revision) gRPC over tonic, and closes the
//! store once both listeners have drained after Ctrl-C.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::ServerConfig;
use contour_domain::Revision;
use contour_store::{SqliteStore, StoreError};
use handlers::{cors_layer, create_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Store could not be opened or closed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A CORS origin is not a valid header value
    #[error("Invalid CORS origin: {0}")]
    InvalidOrigin(String),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[source] std::io::Error),

    /// HTTP server error
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),

    /// gRPC server error
    #[error(transparent)]
    Grpc(#[from] contour_grpc::ServeError),
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured default filter.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Resolve once Ctrl-C is received
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    // A dropped sender also means shut down
    let _ = rx.wait_for(|stop| *stop).await;
}

/// Start the server and run until Ctrl-C
///
/// Opens the store, serves both protocols, then closes the store.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    let revision = config.revision;
    info!("Starting Contour ({} revision)", revision);

    let store = SqliteStore::shared(revision)?;
    let cors = cors_layer(&config.cors_origins).map_err(ServerError::InvalidOrigin)?;

    let app = create_router(AppState::new(revision, store.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = TcpListener::bind(&config.http_addr())
        .await
        .map_err(ServerError::Bind)?;
    info!("REST API listening on http://{}/api", config.http_addr());
    info!("GraphQL endpoint at http://{}/graphql", config.http_addr());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let http = async {
        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown(shutdown_rx.clone()))
            .await
            .map_err(ServerError::Serve)
    };

    let grpc_store = store.clone();
    let grpc_shutdown = wait_for_shutdown(shutdown_rx.clone());
    let grpc = async move {
        match revision {
            Revision::Baseline => {
                contour_grpc::start_server(config.grpc_config(), grpc_store, grpc_shutdown).await?;
            }
            Revision::Feature => {
                drop(grpc_store);
                info!("gRPC disabled for the feature revision");
            }
        }
        Ok::<(), ServerError>(())
    };

    tokio::try_join!(http, grpc)?;

    close_store(store)
}

/// Close the store once every adapter has released it
fn close_store(store: contour_store::SharedStore) -> Result<(), ServerError> {
    match Arc::try_unwrap(store) {
        Ok(mutex) => {
            let store = mutex.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
            store.close()?;
            info!("Store closed");
        }
        Err(_) => warn!("Store still in use at shutdown, dropping without close"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_store_sole_owner() {
        let store = SqliteStore::shared(Revision::Baseline).unwrap();
        assert!(close_store(store).is_ok());
    }

    #[test]
    fn test_close_store_still_shared() {
        let store = SqliteStore::shared(Revision::Feature).unwrap();
        let other = store.clone();
        assert!(close_store(store).is_ok());
        assert_eq!(other.lock().unwrap().revision(), Revision::Feature);
    }

    #[tokio::test]
    async fn test_wait_for_shutdown() {
        let (tx, rx) = watch::channel(false);
        let waiter = tokio::spawn(wait_for_shutdown(rx));
        tx.send(true).unwrap();
        waiter.await.unwrap();
    }
}
