//! Beadle error types.
//!
//! Each variant is a distinct failure kind so callers can branch on it
//! without parsing messages: a UI renders "already licensed" for
//! [`BeadleError::TokenAlreadyApplied`] and "bad token" for
//! [`BeadleError::InvalidToken`].

use thiserror::Error;

/// Errors that can occur during license validation and activation.
#[derive(Debug, Error)]
pub enum BeadleError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Activation token is malformed, unsigned, or not yet valid.
    #[error("Invalid activation token: {reason}")]
    InvalidToken {
        /// What made the token unacceptable.
        reason: String,
    },

    /// The submitted token is the one already applied (idempotent rejection).
    ///
    /// Not an error to the end user; the deployment is already licensed
    /// under this exact token.
    #[error("Activation token already applied")]
    TokenAlreadyApplied,

    /// The submitted token was issued before the currently applied one
    /// (anti-rollback).
    #[error("Activation token is older than the currently applied token")]
    TokenOlderThanCurrent,

    /// Activation was attempted on a revoked deployment.
    #[error("Deployment license has been revoked; activation refused")]
    DeploymentRevoked,

    /// The license store could not be read or written.
    #[error("License store unavailable: {0}")]
    StoreUnavailable(String),

    /// Compare-and-replace lost against a concurrent writer.
    ///
    /// Internal retry signal; the state machine reloads and re-runs its
    /// checks rather than surfacing this to callers.
    #[error("License store version conflict")]
    StoreConflict,

    /// An activation could not be persisted.
    ///
    /// Surfaced loudly: silently dropping a successful activation is
    /// unacceptable.
    #[error("Failed to persist activation: {0}")]
    ActivationPersistFailed(String),
}
