use crate::config::ServiceConfig;
use clap::Parser;
use std::time::Duration;

/// Environment variable holding the webhook endpoint secret
///
/// Taken from the environment rather than argv so the secret does not show
/// up in process listings.
pub const WEBHOOK_SECRET_ENV: &str = "WEBHOOK_SECRET";

/// Serve the marketplace payment sync webhook endpoint
#[derive(Parser, Debug)]
#[command(name = "storefront-payments")]
#[command(about = "Reconcile payment provider events into marketplace state", long_about = None)]
pub struct CliArgs {
    /// Bind host for the webhook endpoint
    #[arg(
        long = "host",
        value_name = "HOST",
        default_value = "0.0.0.0",
        help = "Host to bind the webhook endpoint to"
    )]
    pub host: String,

    /// Bind port for the webhook endpoint
    #[arg(
        long = "port",
        value_name = "PORT",
        default_value_t = 8787,
        help = "Port to bind the webhook endpoint to"
    )]
    pub port: u16,

    /// Accepted delivery-timestamp skew for signature verification
    #[arg(
        long = "signature-tolerance",
        value_name = "SECONDS",
        help = "Reject deliveries whose signature timestamp is older than this (default: 300)"
    )]
    pub signature_tolerance_secs: Option<i64>,

    /// Deadline for each outbound provider call
    #[arg(
        long = "command-timeout-ms",
        value_name = "MILLIS",
        help = "Fail outbound provider calls that exceed this deadline (default: 10000)"
    )]
    pub command_timeout_ms: Option<u64>,
}

impl CliArgs {
    /// Build the service configuration from CLI arguments and environment
    ///
    /// The webhook secret is read from `WEBHOOK_SECRET`; a missing secret is
    /// an error because an unsigned endpoint would accept forged events.
    pub fn to_config(&self) -> Result<ServiceConfig, String> {
        let webhook_secret = std::env::var(WEBHOOK_SECRET_ENV)
            .map_err(|_| format!("{WEBHOOK_SECRET_ENV} is not set"))?;
        if webhook_secret.is_empty() {
            return Err(format!("{WEBHOOK_SECRET_ENV} is empty"));
        }

        let default = ServiceConfig::default();
        Ok(ServiceConfig {
            host: self.host.clone(),
            port: self.port,
            webhook_secret,
            signature_tolerance_secs: self
                .signature_tolerance_secs
                .unwrap_or(default.signature_tolerance_secs),
            command_timeout: self
                .command_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(default.command_timeout),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::defaults(&["program"], "0.0.0.0", 8787)]
    #[case::custom_host(&["program", "--host", "127.0.0.1"], "127.0.0.1", 8787)]
    #[case::custom_port(&["program", "--port", "9000"], "0.0.0.0", 9000)]
    #[case::both(&["program", "--host", "::1", "--port", "0"], "::1", 0)]
    fn test_bind_options(#[case] args: &[&str], #[case] host: &str, #[case] port: u16) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.host, host);
        assert_eq!(parsed.port, port);
    }

    #[rstest]
    #[case::tolerance(&["program", "--signature-tolerance", "60"], Some(60), None)]
    #[case::timeout(&["program", "--command-timeout-ms", "2500"], None, Some(2500))]
    #[case::neither(&["program"], None, None)]
    fn test_tuning_options(
        #[case] args: &[&str],
        #[case] tolerance: Option<i64>,
        #[case] timeout_ms: Option<u64>,
    ) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.signature_tolerance_secs, tolerance);
        assert_eq!(parsed.command_timeout_ms, timeout_ms);
    }
}
