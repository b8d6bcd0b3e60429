// Vaultlink — Application Entry Point
//
// Parses CLI arguments, initializes structured logging (with a filter that
// never emits secret values), and dispatches to the command handler.
// Uses tokio async runtime for the gateway server and store round trips.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vaultlink::cli::{execute, Cli};

#[tokio::main]
async fn main() {
    // Initialize tracing with env filter (RUST_LOG=vaultlink=debug for verbose
    // output). The default level is `info`, which never includes secret values.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vaultlink=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = execute(cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
