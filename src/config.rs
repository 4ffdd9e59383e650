//! Service configuration

use std::time::Duration;

use crate::http::signature::DEFAULT_TOLERANCE_SECS;
use crate::sync::commands::DEFAULT_COMMAND_TIMEOUT;

/// Runtime configuration for the payment sync service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Bind host for the webhook endpoint
    pub host: String,
    /// Bind port for the webhook endpoint
    pub port: u16,
    /// Shared secret for webhook signature verification
    pub webhook_secret: String,
    /// Accepted delivery-timestamp skew in seconds
    pub signature_tolerance_secs: i64,
    /// Deadline applied to each outbound provider call
    pub command_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8787,
            webhook_secret: String::new(),
            signature_tolerance_secs: DEFAULT_TOLERANCE_SECS,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}
