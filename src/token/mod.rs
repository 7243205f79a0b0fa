//! Activation token codec.
//!
//! Tokens are opaque, self-contained credentials in the form
//! `lt1.<base64url claims>.<base64url signature>`. The leading segment is
//! a version tag so the signature scheme can evolve without invalidating
//! already-issued tokens. The Ed25519 signature covers the encoded claims
//! segment and is checked before any claim is trusted; a structural or
//! signature failure yields `InvalidToken` with no partial trust.

pub mod claims;
pub mod fingerprint;
pub mod verify;

pub use claims::TokenClaims;
pub use fingerprint::token_fingerprint;

use crate::BeadleError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};

/// Version tag of the current token format.
pub const TOKEN_VERSION_TAG: &str = "lt1";

/// Minimum length of a submitted token string.
///
/// The inbound contract: anything shorter cannot be a well-formed token
/// and is rejected before parsing.
pub const MIN_TOKEN_LEN: usize = 32;

/// A decoded, signature-verified activation token.
#[derive(Debug, Clone)]
pub struct DecodedToken {
    /// Verified claims.
    pub claims: TokenClaims,

    /// SHA-256 fingerprint of the token string.
    pub fingerprint: String,
}

/// Decode and verify an activation token.
///
/// Verification order is fail-closed: structure, then signature, then
/// claims, then issuance-time sanity. `clock_skew_tolerance` bounds how
/// far in the future an issuance timestamp may sit before the token is
/// rejected as not yet valid.
///
/// Pure function of its inputs; no side effects.
///
/// # Errors
/// Returns [`BeadleError::InvalidToken`] for any malformed, unsigned,
/// badly signed, or future-dated token, and
/// [`BeadleError::ConfigError`] if the verification key itself is
/// unusable.
pub fn decode(
    token: &str,
    verify_key_hex: &str,
    now: DateTime<Utc>,
    clock_skew_tolerance: std::time::Duration,
) -> Result<DecodedToken, BeadleError> {
    let token = token.trim();

    if token.len() < MIN_TOKEN_LEN {
        return Err(BeadleError::InvalidToken {
            reason: format!("token shorter than {} characters", MIN_TOKEN_LEN),
        });
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(BeadleError::InvalidToken {
            reason: "token must have three dot-separated segments".to_string(),
        });
    }

    let (version, claims_b64, signature_b64) = (parts[0], parts[1], parts[2]);

    if version != TOKEN_VERSION_TAG {
        return Err(BeadleError::InvalidToken {
            reason: format!("unsupported token version: {}", version),
        });
    }

    // Signature first: claims are untrusted bytes until this passes.
    let verifying_key = verify::decode_verify_key(verify_key_hex)?;
    verify::verify_token_signature(signature_b64, claims_b64.as_bytes(), &verifying_key)?;

    let claims_json = URL_SAFE_NO_PAD
        .decode(claims_b64)
        .map_err(|e| BeadleError::InvalidToken {
            reason: format!("invalid claims base64: {}", e),
        })?;

    let claims: TokenClaims =
        serde_json::from_slice(&claims_json).map_err(|e| BeadleError::InvalidToken {
            reason: format!("invalid claims JSON: {}", e),
        })?;

    let skew = Duration::seconds(clock_skew_tolerance.as_secs() as i64);
    if claims.issued_at > now + skew {
        return Err(BeadleError::InvalidToken {
            reason: "not yet valid".to_string(),
        });
    }

    Ok(DecodedToken {
        claims,
        fingerprint: token_fingerprint(token),
    })
}
