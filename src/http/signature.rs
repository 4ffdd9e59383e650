//! Webhook signature verification
//!
//! The provider signs each delivery with an HMAC-SHA256 over
//! `"{timestamp}.{body}"` and sends it as `t=<unix>,v1=<hex>`. Verification
//! recomputes the MAC with the shared endpoint secret and rejects stale
//! timestamps, which bounds the replay window for captured deliveries.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::types::SyncError;

type HmacSha256 = Hmac<Sha256>;

/// Accepted clock skew between the provider's timestamp and ours
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Verifier for `t=...,v1=...` signature headers
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl SignatureVerifier {
    /// Create a verifier with the default timestamp tolerance
    pub fn new(secret: impl Into<String>) -> Self {
        SignatureVerifier {
            secret: secret.into(),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Create a verifier with an explicit timestamp tolerance
    pub fn with_tolerance(secret: impl Into<String>, tolerance_secs: i64) -> Self {
        SignatureVerifier {
            secret: secret.into(),
            tolerance_secs,
        }
    }

    /// Verify a signature header against the raw request body
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidSignature`] when the header is
    /// unparseable, the timestamp is outside the tolerance window, or the
    /// MAC does not match. The MAC comparison is constant-time.
    pub fn verify(&self, payload: &[u8], header: &str) -> Result<(), SyncError> {
        let (timestamp, signature) = parse_header(header)?;

        let age = (Utc::now().timestamp() - timestamp).abs();
        if age > self.tolerance_secs {
            return Err(SyncError::invalid_signature(format!(
                "timestamp outside tolerance ({age}s old)"
            )));
        }

        let signature_bytes = hex::decode(signature)
            .map_err(|_| SyncError::invalid_signature("signature is not valid hex"))?;

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.verify_slice(&signature_bytes)
            .map_err(|_| SyncError::invalid_signature("signature mismatch"))
    }

    /// Produce a signature header for a payload
    ///
    /// The counterpart of [`verify`](Self::verify); used by tests and by
    /// local tooling that replays captured deliveries.
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
    }
}

/// Split `t=<unix>,v1=<hex>` into its parts
fn parse_header(header: &str) -> Result<(i64, &str), SyncError> {
    let mut timestamp = None;
    let mut signature = None;

    for part in header.split(',') {
        match part.split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signature = Some(value),
            _ => {}
        }
    }

    match (timestamp, signature) {
        (Some(timestamp), Some(signature)) => Ok((timestamp, signature)),
        _ => Err(SyncError::invalid_signature(
            "expected header of the form t=<unix>,v1=<hex>",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test123";

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(SECRET)
    }

    #[test]
    fn test_valid_signature_accepted() {
        let v = verifier();
        let payload = br#"{"type":"payment_intent.succeeded"}"#;
        let header = v.sign(payload, Utc::now().timestamp());

        assert!(v.verify(payload, &header).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let v = verifier();
        let header = v.sign(b"original", Utc::now().timestamp());

        let result = v.verify(b"tampered", &header);
        assert!(matches!(result, Err(SyncError::InvalidSignature { .. })));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signer = SignatureVerifier::new("whsec_other");
        let header = signer.sign(b"payload", Utc::now().timestamp());

        let result = verifier().verify(b"payload", &header);
        assert!(matches!(result, Err(SyncError::InvalidSignature { .. })));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let v = verifier();
        // 10 minutes ago, beyond the 5-minute tolerance
        let stale = Utc::now().timestamp() - 600;
        let header = v.sign(b"payload", stale);

        let result = v.verify(b"payload", &header);
        assert!(matches!(result, Err(SyncError::InvalidSignature { .. })));
    }

    #[test]
    fn test_future_timestamp_rejected() {
        let v = verifier();
        let future = Utc::now().timestamp() + 600;
        let header = v.sign(b"payload", future);

        assert!(v.verify(b"payload", &header).is_err());
    }

    #[test]
    fn test_malformed_header_rejected() {
        let v = verifier();
        for header in ["", "t=abc,v1=00", "v1=00", "t=123", "nonsense"] {
            assert!(v.verify(b"payload", header).is_err(), "header: {header}");
        }
    }

    #[test]
    fn test_non_hex_signature_rejected() {
        let v = verifier();
        let header = format!("t={},v1=zzzz", Utc::now().timestamp());
        assert!(v.verify(b"payload", &header).is_err());
    }
}
