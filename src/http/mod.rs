//! Inbound webhook HTTP surface
//!
//! - `signature` - HMAC verification of delivery signatures
//! - `payload` - wire JSON to [`EventEnvelope`](crate::types::EventEnvelope)
//! - `routes` - the webhook and health endpoints
//! - `server` - router assembly and serving
//! - `state` - per-process application state
//! - `error` - HTTP-facing error mapping

pub mod error;
pub mod payload;
pub mod routes;
pub mod server;
pub mod signature;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::{create_router, SIGNATURE_HEADER};
pub use server::{create_server, run_server, start_background_server};
pub use signature::SignatureVerifier;
pub use state::AppState;
