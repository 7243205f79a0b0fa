//! Ed25519 signature verification for activation tokens.

use crate::BeadleError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::RwLock;

/// Cache for decoded verifying keys.
static KEY_CACHE: OnceCell<RwLock<HashMap<String, VerifyingKey>>> = OnceCell::new();

/// Decode a hex-encoded Ed25519 verification key.
///
/// The key is cached after first decode for performance.
pub fn decode_verify_key(hex_key: &str) -> Result<VerifyingKey, BeadleError> {
    // Check cache first
    let cache = KEY_CACHE.get_or_init(|| RwLock::new(HashMap::new()));
    if let Ok(guard) = cache.read() {
        if let Some(key) = guard.get(hex_key) {
            return Ok(*key);
        }
    }

    // Decode from hex
    let bytes = hex::decode(hex_key)
        .map_err(|e| BeadleError::ConfigError(format!("Invalid verify key hex: {}", e)))?;

    let key_array: [u8; 32] = bytes
        .try_into()
        .map_err(|_| BeadleError::ConfigError("Verify key must be 32 bytes".to_string()))?;

    let verifying_key = VerifyingKey::from_bytes(&key_array)
        .map_err(|e| BeadleError::ConfigError(format!("Invalid Ed25519 verify key: {}", e)))?;

    // Best-effort insert into cache. If locking fails, still return the decoded key.
    if let Ok(mut guard) = cache.write() {
        guard.insert(hex_key.to_string(), verifying_key);
    }

    Ok(verifying_key)
}

/// Verify an Ed25519 signature over the encoded claims segment.
///
/// The signature covers the base64url-encoded claims bytes, not the
/// decoded JSON, matching the issuing server.
pub fn verify_token_signature(
    signature_b64: &str,
    signed_bytes: &[u8],
    verifying_key: &VerifyingKey,
) -> Result<(), BeadleError> {
    let sig_bytes = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|e| {
        BeadleError::InvalidToken {
            reason: format!("invalid signature base64: {}", e),
        }
    })?;

    let signature = Signature::from_slice(&sig_bytes).map_err(|_| BeadleError::InvalidToken {
        reason: "invalid signature length".to_string(),
    })?;

    verifying_key
        .verify(signed_bytes, &signature)
        .map_err(|_| BeadleError::InvalidToken {
            reason: "signature mismatch".to_string(),
        })?;

    Ok(())
}
