//! Stripe-style webhook signatures.
//!
//! The provider signs `"{timestamp}.{raw body}"` with HMAC-SHA256 and sends the
//! result in a header of the form `t=<unix seconds>,v1=<hex digest>`. Several
//! `v1` entries may be present while a secret is being rolled; any one of them
//! matching is enough.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Scheme name of the signatures we check.
pub const EXPECTED_SCHEME: &str = "v1";

/// Default replay window, in seconds.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("No stripe-signature header value was provided.")]
    MissingHeader,

    #[error("Unable to extract timestamp and signatures from header")]
    MalformedHeader,

    #[error("No signatures found with expected scheme")]
    NoExpectedScheme,

    #[error("No signatures found matching the expected signature for payload. Are you passing the raw request body you received from Stripe?")]
    NoMatchingSignature,

    #[error("Timestamp outside the tolerance zone")]
    TimestampOutsideTolerance,

    #[error("Invalid webhook secret")]
    InvalidSecret,
}

/// Parsed `stripe-signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub signatures: Vec<String>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, SignatureError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for item in header.split(',') {
            let Some((key, value)) = item.trim().split_once('=') else {
                continue;
            };

            match key {
                "t" => timestamp = value.parse::<i64>().ok(),
                EXPECTED_SCHEME => signatures.push(value.to_string()),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
        if signatures.is_empty() {
            return Err(SignatureError::NoExpectedScheme);
        }

        Ok(Self { timestamp, signatures })
    }
}

fn signed_mac(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::InvalidSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Hex digest the provider would send for `payload` at `timestamp`.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, SignatureError> {
    let mac = signed_mac(secret, timestamp, payload)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Full header value (`t=...,v1=...`) for `payload` at `timestamp`.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, SignatureError> {
    let signature = compute_signature(secret, timestamp, payload)?;
    Ok(format!("t={},{}={}", timestamp, EXPECTED_SCHEME, signature))
}

/// Checks `header` against the exact bytes of `payload`.
///
/// `tolerance` of zero disables the timestamp check. `now` is the current
/// Unix time in seconds. Returns the signed timestamp on success.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance: i64,
    now: i64,
) -> Result<i64, SignatureError> {
    let header = SignatureHeader::parse(header)?;
    let mac = signed_mac(secret, header.timestamp, payload)?;

    // verify_slice compares in constant time
    let matched = header.signatures.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });

    if !matched {
        return Err(SignatureError::NoMatchingSignature);
    }

    if tolerance > 0 && header.timestamp < now - tolerance {
        return Err(SignatureError::TimestampOutsideTolerance);
    }

    Ok(header.timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const NOW: i64 = 1_700_000_100;

    #[test]
    fn test_parse_signature_header() {
        let header = SignatureHeader::parse("t=1700000000,v1=abc123,v0=old,v1=def456").unwrap();
        assert_eq!(header.timestamp, 1_700_000_000);
        assert_eq!(header.signatures, vec!["abc123".to_string(), "def456".to_string()]);
    }

    #[test]
    fn test_parse_signature_header_missing_timestamp() {
        assert_eq!(
            SignatureHeader::parse("v1=abc123"),
            Err(SignatureError::MalformedHeader)
        );
        assert_eq!(
            SignatureHeader::parse("garbage"),
            Err(SignatureError::MalformedHeader)
        );
        assert_eq!(
            SignatureHeader::parse("t=notanumber,v1=abc"),
            Err(SignatureError::MalformedHeader)
        );
    }

    #[test]
    fn test_parse_signature_header_without_v1() {
        assert_eq!(
            SignatureHeader::parse("t=1700000000,v0=abc123"),
            Err(SignatureError::NoExpectedScheme)
        );
    }

    #[test]
    fn test_verify_valid_signature() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let header = signature_header(SECRET, 1_700_000_000, payload).unwrap();

        let timestamp = verify_signature(payload, &header, SECRET, DEFAULT_TOLERANCE_SECS, NOW).unwrap();
        assert_eq!(timestamp, 1_700_000_000);
    }

    #[test]
    fn test_verify_any_matching_v1_passes() {
        let payload = br#"{"type":"payment_method.attached"}"#;
        let good = compute_signature(SECRET, 1_700_000_000, payload).unwrap();
        let header = format!("t=1700000000,v1={},v1={}", "00".repeat(32), good);

        assert!(verify_signature(payload, &header, SECRET, DEFAULT_TOLERANCE_SECS, NOW).is_ok());
    }

    #[test]
    fn test_verify_wrong_secret() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let header = signature_header("whsec_other", 1_700_000_000, payload).unwrap();

        assert_eq!(
            verify_signature(payload, &header, SECRET, DEFAULT_TOLERANCE_SECS, NOW),
            Err(SignatureError::NoMatchingSignature)
        );
    }

    #[test]
    fn test_verify_modified_payload() {
        let original = br#"{"type":"checkout.session.completed"}"#;
        // Same JSON, different bytes
        let reformatted = br#"{ "type": "checkout.session.completed" }"#;
        let header = signature_header(SECRET, 1_700_000_000, original).unwrap();

        assert_eq!(
            verify_signature(reformatted, &header, SECRET, DEFAULT_TOLERANCE_SECS, NOW),
            Err(SignatureError::NoMatchingSignature)
        );
    }

    #[test]
    fn test_verify_non_hex_signature() {
        let payload = b"{}";
        assert_eq!(
            verify_signature(payload, "t=1700000000,v1=zzzz", SECRET, DEFAULT_TOLERANCE_SECS, NOW),
            Err(SignatureError::NoMatchingSignature)
        );
    }

    #[test]
    fn test_verify_old_timestamp() {
        let payload = b"{}";
        let header = signature_header(SECRET, NOW - 600, payload).unwrap();

        assert_eq!(
            verify_signature(payload, &header, SECRET, DEFAULT_TOLERANCE_SECS, NOW),
            Err(SignatureError::TimestampOutsideTolerance)
        );
        // Zero tolerance turns the check off
        assert!(verify_signature(payload, &header, SECRET, 0, NOW).is_ok());
    }

    #[test]
    fn test_signature_header_format() {
        let header = signature_header(SECRET, 42, b"body").unwrap();
        assert!(header.starts_with("t=42,v1="));
        assert_eq!(header.len(), "t=42,v1=".len() + 64);
    }
}
