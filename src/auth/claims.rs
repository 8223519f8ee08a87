//! Access-token payload inspection.
//!
//! Login responses do not always carry the user's role in the body; when
//! they don't, the role is read from the JWT access token's payload
//! segment. This is claim peeking only; the signature is never verified,
//! and the server remains the authority on what the token actually grants.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use tracing::debug;

use super::Role;

#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    user_type: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

/// Extract the role claim from a JWT access token.
///
/// Looks at `user_type` first, then `role`. Malformed tokens, undecodable
/// payloads, and missing claims all fall back to `Role::Buyer`.
pub fn role_from_token(access_token: &str) -> Role {
    match decode_claims(access_token) {
        Some(claims) => claims
            .user_type
            .or(claims.role)
            .map(|s| Role::parse(&s))
            .unwrap_or_default(),
        None => {
            debug!("Could not decode role claim from access token");
            Role::default()
        }
    }
}

fn decode_claims(token: &str) -> Option<TokenClaims> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_token(payload_json: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(payload_json.as_bytes());
        format!("{}.{}.signature", header, payload)
    }

    #[test]
    fn reads_user_type_claim() {
        let token = make_token(r#"{"user_type":"farmer","exp":1735689600}"#);
        assert_eq!(role_from_token(&token), Role::Farmer);
    }

    #[test]
    fn falls_back_to_role_claim() {
        let token = make_token(r#"{"role":"farmer"}"#);
        assert_eq!(role_from_token(&token), Role::Farmer);
    }

    #[test]
    fn defaults_to_buyer_on_missing_claims() {
        let token = make_token(r#"{"exp":1735689600,"user_id":7}"#);
        assert_eq!(role_from_token(&token), Role::Buyer);
    }

    #[test]
    fn defaults_to_buyer_on_garbage() {
        assert_eq!(role_from_token("not-a-jwt"), Role::Buyer);
        assert_eq!(role_from_token("a.!!!.c"), Role::Buyer);
        assert_eq!(role_from_token(""), Role::Buyer);
    }
}
