//! Local inspection of JWT access tokens.
//!
//! Only the payload's `exp` claim is read. Signatures are not verified; the
//! backend stays the authority and will reject forged tokens with a 401.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Returns the expiry instant encoded in the token, if it can be decoded.
pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    Utc.timestamp_opt(claims.exp?, 0).single()
}

/// True when the token is expired at `now`.
///
/// Tokens without a decodable `exp` claim count as expired; restoring a
/// session from one would only fail later against the backend.
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match expires_at(token) {
        Some(expiry) => expiry <= now,
        None => true,
    }
}

pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn token_with_payload(payload: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_reads_exp_claim() {
        let token = token_with_payload(r#"{"exp": 1700000000, "user_id": 1}"#);
        assert_eq!(expires_at(&token).unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_expiry_comparison() {
        let token = token_with_payload(r#"{"exp": 1700000000}"#);
        let before = Utc.timestamp_opt(1_699_999_999, 0).unwrap();
        let after = Utc.timestamp_opt(1_700_000_001, 0).unwrap();
        assert!(!is_expired_at(&token, before));
        assert!(is_expired_at(&token, after));
    }

    #[test]
    fn test_padded_payload_is_accepted() {
        let payload = base64::engine::general_purpose::URL_SAFE.encode(r#"{"exp":4102444800}"#);
        let token = format!("h.{payload}.s");
        assert!(!is_expired_at(&token, Utc.timestamp_opt(0, 0).unwrap()));
    }

    #[test]
    fn test_malformed_tokens_count_as_expired() {
        assert!(is_expired("not-a-jwt"));
        assert!(is_expired("a.!!!.c"));
        assert!(is_expired(&token_with_payload(r#"{"sub": "no-exp"}"#)));
    }
}
