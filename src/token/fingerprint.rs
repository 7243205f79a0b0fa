//! Token fingerprinting for replay and rollback detection.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 fingerprint of an activation token.
///
/// The fingerprint is what the record stores in place of the raw token:
/// it detects re-submission of the identical token without keeping the
/// credential itself on disk.
pub fn token_fingerprint(token: &str) -> String {
    let hash = Sha256::digest(token.trim().as_bytes());
    hex::encode(hash)
}
