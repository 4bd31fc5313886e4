//! Contour CLI
//!
//! Starts the REST, GraphQL and gRPC listeners over one in-memory store.

use contour_server::{config::ServerConfig, init_tracing, start_server, ServerError};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        ServerConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        ServerConfig::default()
    };

    // Environment wins over the file
    let config = config.with_env()?;

    init_tracing(&config.log_filter);

    start_server(config).await
}

fn print_help() {
    println!("Contour - REST, GraphQL and gRPC over one schema");
    println!();
    println!("USAGE:");
    println!("    contour [--config <path-to-config.toml>]");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file may contain:");
    println!("    - bind_address: IP address to bind (default '127.0.0.1')");
    println!("    - http_port: REST + GraphQL port (default 3000)");
    println!("    - grpc_port: gRPC port (default 50051)");
    println!("    - revision: 'baseline' or 'feature' (default 'baseline')");
    println!("    - cors_origins: allowed browser origins");
    println!("    - log_filter: tracing filter when RUST_LOG is unset (default 'info')");
    println!();
    println!("ENVIRONMENT:");
    println!("    PORT, GRPC_PORT, CONTOUR_REVISION override the file; RUST_LOG overrides log_filter");
    println!();
}
