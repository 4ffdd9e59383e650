//! Payment Sync Service
//!
//! Serves the signed webhook endpoint that reconciles payment provider
//! events into marketplace state.
//!
//! # Usage
//!
//! ```bash
//! WEBHOOK_SECRET=whsec_... cargo run -- --port 8787
//! WEBHOOK_SECRET=whsec_... cargo run -- --host 127.0.0.1 --command-timeout-ms 5000
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing secret, bind failure, etc.)

use std::process;

use storefront_payments::cli;
use storefront_payments::http::run_server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_payments=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = cli::parse_args();

    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_server(&config).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
