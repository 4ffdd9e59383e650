//! Webhook server setup

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::http::routes::create_router;
use crate::http::signature::SignatureVerifier;
use crate::http::state::AppState;

/// Build the router and bind address from config
pub fn create_server(config: &ServiceConfig) -> Result<(Router, SocketAddr, AppState), std::net::AddrParseError> {
    let verifier =
        SignatureVerifier::with_tolerance(&config.webhook_secret, config.signature_tolerance_secs);
    let state = AppState::new(verifier);

    let router = create_router(state.clone()).layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    Ok((router, addr, state))
}

/// Run the webhook server until the process exits
pub async fn run_server(
    config: &ServiceConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (router, addr, _state) = create_server(config)?;

    tracing::info!("payment sync server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

/// Start the server in the background (for testing)
///
/// Binds first so a port of 0 resolves to the actual address, then serves
/// on a spawned task. Returns the bound address and the state handle so the
/// caller can seed directories and observe stores.
pub async fn start_background_server(
    config: &ServiceConfig,
) -> Result<(SocketAddr, AppState), Box<dyn std::error::Error + Send + Sync>> {
    let (router, addr, state) = create_server(config)?;

    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("server error: {}", e);
        }
    });

    Ok((actual_addr, state))
}
