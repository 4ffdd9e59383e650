//! Webhook and health endpoints

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::info;

use crate::core::reconciler::Outcome;
use crate::http::error::{ApiError, ApiResult};
use crate::http::payload::parse_event;
use crate::http::state::AppState;

/// Header carrying the delivery signature
pub const SIGNATURE_HEADER: &str = "x-provider-signature";

/// Acknowledgement body returned on 200
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    /// What happened to the delivery: applied, duplicate, dropped, ignored
    pub outcome: &'static str,
}

/// Health check body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
}

/// Build the service router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhooks/payments", post(receive_webhook))
        .with_state(state)
}

/// Liveness probe
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: state.version.clone(),
    })
}

/// Receive one provider delivery
///
/// Verifies the signature against the raw body, decodes the event, and runs
/// it through the reconciler. Responds 200 once processed — including
/// duplicates, unknown types, and dropped references, where a provider
/// retry cannot change the result — and 4xx only for deliveries the
/// provider should retry after fixing (bad signature, malformed body).
async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::BadSignature("missing signature header".to_string()))?;

    state.verifier.verify(&body, signature)?;

    let Some(envelope) = parse_event(&body)? else {
        return Ok(Json(WebhookAck { outcome: "ignored" }));
    };

    let outcome = match state.reconciler.apply(&envelope) {
        Outcome::Applied => "applied",
        Outcome::Duplicate => "duplicate",
        Outcome::Skipped { .. } => "dropped",
    };
    info!(event = %envelope.id, outcome, "webhook processed");

    Ok(Json(WebhookAck { outcome }))
}
