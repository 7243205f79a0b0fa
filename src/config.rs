//! Beadle configuration.

use std::time::Duration;

/// Configuration for license validation and activation.
///
/// All values are supplied by the deployment, not owned by this crate:
/// the billing system that issues tokens decides the trial length and
/// holds the signing key matching `verify_key_hex`.
#[derive(Debug, Clone)]
pub struct BeadleConfig {
    /// Length of the trial period that starts at first boot.
    pub trial_length: Duration,

    /// Ed25519 verification key for activation tokens (hex-encoded, 64 characters).
    /// SECURITY: This should be hard-coded in your application, not from environment.
    /// It verifies only; issuing tokens requires the signing key held by
    /// the billing system.
    pub verify_key_hex: &'static str,

    /// Tolerance for token issuance timestamps in the future.
    /// Covers ordinary clock skew between the issuer and this deployment;
    /// anything beyond it is rejected as not yet valid.
    pub clock_skew_tolerance: Duration,

    /// Store namespace for the persisted license record.
    /// Each product should use a unique namespace to avoid collisions.
    pub store_namespace: &'static str,
}

impl BeadleConfig {
    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), crate::BeadleError> {
        if self.trial_length.as_secs() == 0 {
            return Err(crate::BeadleError::ConfigError(
                "trial_length cannot be zero".to_string(),
            ));
        }
        if self.verify_key_hex.len() != 64 {
            return Err(crate::BeadleError::ConfigError(format!(
                "verify_key_hex must be 64 hex characters, got {}",
                self.verify_key_hex.len()
            )));
        }
        if self.store_namespace.is_empty() {
            return Err(crate::BeadleError::ConfigError(
                "store_namespace cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> BeadleConfig {
        BeadleConfig {
            trial_length: Duration::from_secs(30 * 24 * 60 * 60),
            verify_key_hex: "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a",
            clock_skew_tolerance: Duration::from_secs(60),
            store_namespace: "beadle-test",
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn zero_trial_length_rejected() {
        let mut config = base_config();
        config.trial_length = Duration::from_secs(0);
        assert!(matches!(
            config.validate(),
            Err(crate::BeadleError::ConfigError(_))
        ));
    }

    #[test]
    fn short_verify_key_rejected() {
        let mut config = base_config();
        config.verify_key_hex = "abcd";
        assert!(matches!(
            config.validate(),
            Err(crate::BeadleError::ConfigError(_))
        ));
    }

    #[test]
    fn empty_namespace_rejected() {
        let mut config = base_config();
        config.store_namespace = "";
        assert!(matches!(
            config.validate(),
            Err(crate::BeadleError::ConfigError(_))
        ));
    }
}
