//! The persisted license record and its state transitions.
//!
//! Exactly one record exists per deployment. It is replaced, never
//! duplicated: every transition builds a successor record with the
//! version counter bumped, and the store's compare-and-replace decides
//! which writer wins.

use crate::token::DecodedToken;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Licensing state of a deployment.
///
/// `Invalid` is an error-reporting pseudo-state: it appears in rendered
/// status payloads when the store cannot be read, but the state machine
/// never persists it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseState {
    /// Time-boxed unlicensed usage period, started at first boot.
    Trial,
    /// A verified activation token licenses this deployment to a customer.
    Activated,
    /// The trial or activation entitlement window has lapsed.
    Expired,
    /// Administratively revoked (e.g. chargeback).
    Revoked,
    /// The store could not be read; reporting only, never persisted.
    Invalid,
}

/// Fingerprint of the last successfully applied activation token.
///
/// The digest rejects replay of the identical token; the issuance
/// instant rejects rollback to any older token, even one with a later
/// expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenFingerprint {
    /// Lowercase hex SHA-256 of the token string.
    pub digest: String,

    /// Issuance instant of the fingerprinted token.
    pub issued_at: DateTime<Utc>,
}

/// The single persisted license record for a deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseRecord {
    /// Monotonic write counter; the compare-and-replace token.
    pub version: u64,

    /// Current persisted state. Never `Invalid`.
    pub state: LicenseState,

    /// Customer identifier; present exactly when the record has been activated.
    pub customer: Option<String>,

    /// End of the trial window. Set once at first initialization and
    /// never mutated by activation.
    pub trial_expires_at: DateTime<Utc>,

    /// End of the licensed entitlement window; `None` means perpetual.
    /// Always `None` while in trial.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub license_expires_at: Option<DateTime<Utc>>,

    /// Fingerprint of the last applied token, for replay and rollback checks.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub activated_token: Option<TokenFingerprint>,

    /// Administrative reason recorded at revocation.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub revoked_reason: Option<String>,

    /// When the machine last wrote this record. Observability only;
    /// decisions never read it.
    pub last_checked_at: DateTime<Utc>,
}

impl LicenseRecord {
    /// Build the first-boot trial record.
    pub fn trial(now: DateTime<Utc>, trial_length: chrono::Duration) -> Self {
        Self {
            version: 1,
            state: LicenseState::Trial,
            customer: None,
            trial_expires_at: now + trial_length,
            license_expires_at: None,
            activated_token: None,
            revoked_reason: None,
            last_checked_at: now,
        }
    }

    /// Build the successor record for a verified activation.
    ///
    /// The trial window is carried over untouched; only the entitlement
    /// fields and the fingerprint change.
    pub fn activated(&self, token: &DecodedToken, now: DateTime<Utc>) -> Self {
        Self {
            version: self.version + 1,
            state: LicenseState::Activated,
            customer: Some(token.claims.customer.clone()),
            trial_expires_at: self.trial_expires_at,
            license_expires_at: token.claims.expires_at,
            activated_token: Some(TokenFingerprint {
                digest: token.fingerprint.clone(),
                issued_at: token.claims.issued_at,
            }),
            revoked_reason: None,
            last_checked_at: now,
        }
    }

    /// Build the successor record for an observed lapse.
    pub fn expired(&self, now: DateTime<Utc>) -> Self {
        Self {
            version: self.version + 1,
            state: LicenseState::Expired,
            last_checked_at: now,
            ..self.clone()
        }
    }

    /// Build the successor record for an administrative revocation.
    ///
    /// The fingerprint is kept so anti-rollback still holds against the
    /// revoked token.
    pub fn revoked(&self, reason: &str, now: DateTime<Utc>) -> Self {
        Self {
            version: self.version + 1,
            state: LicenseState::Revoked,
            customer: None,
            trial_expires_at: self.trial_expires_at,
            license_expires_at: None,
            activated_token: self.activated_token.clone(),
            revoked_reason: Some(reason.to_string()),
            last_checked_at: now,
        }
    }

    /// Serialize the record to JSON.
    pub fn to_json(&self) -> Result<String, crate::BeadleError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::BeadleError::StoreUnavailable(format!("Failed to serialize record: {}", e)))
    }

    /// Deserialize a record from JSON.
    pub fn from_json(json: &str) -> Result<Self, crate::BeadleError> {
        serde_json::from_str(json)
            .map_err(|e| crate::BeadleError::StoreUnavailable(format!("Failed to deserialize record: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{DecodedToken, TokenClaims};
    use chrono::TimeZone;

    fn day0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn decoded(customer: &str, issued_at: DateTime<Utc>, expires_at: Option<DateTime<Utc>>) -> DecodedToken {
        DecodedToken {
            claims: TokenClaims {
                customer: customer.to_string(),
                issued_at,
                expires_at,
            },
            fingerprint: "aa".repeat(32),
        }
    }

    #[test]
    fn trial_record_shape() {
        let record = LicenseRecord::trial(day0(), chrono::Duration::days(30));
        assert_eq!(record.version, 1);
        assert_eq!(record.state, LicenseState::Trial);
        assert_eq!(record.customer, None);
        assert_eq!(record.trial_expires_at, day0() + chrono::Duration::days(30));
        assert_eq!(record.license_expires_at, None);
        assert!(record.activated_token.is_none());
    }

    #[test]
    fn activation_preserves_trial_window() {
        let record = LicenseRecord::trial(day0(), chrono::Duration::days(30));
        let token = decoded("parish-042", day0(), None);
        let activated = record.activated(&token, day0() + chrono::Duration::hours(1));

        assert_eq!(activated.version, 2);
        assert_eq!(activated.state, LicenseState::Activated);
        assert_eq!(activated.customer.as_deref(), Some("parish-042"));
        assert_eq!(activated.trial_expires_at, record.trial_expires_at);
        assert_eq!(activated.license_expires_at, None);
        assert_eq!(
            activated.activated_token.as_ref().unwrap().issued_at,
            day0()
        );
    }

    #[test]
    fn expiry_keeps_entitlement_fields() {
        let record = LicenseRecord::trial(day0(), chrono::Duration::days(30));
        let token = decoded("parish-042", day0(), Some(day0() + chrono::Duration::days(365)));
        let activated = record.activated(&token, day0());
        let expired = activated.expired(day0() + chrono::Duration::days(400));

        assert_eq!(expired.version, 3);
        assert_eq!(expired.state, LicenseState::Expired);
        assert_eq!(expired.customer.as_deref(), Some("parish-042"));
        assert_eq!(expired.license_expires_at, activated.license_expires_at);
        assert_eq!(expired.activated_token, activated.activated_token);
    }

    #[test]
    fn revocation_clears_entitlement_but_keeps_fingerprint() {
        let record = LicenseRecord::trial(day0(), chrono::Duration::days(30));
        let token = decoded("parish-042", day0(), None);
        let activated = record.activated(&token, day0());
        let revoked = activated.revoked("chargeback", day0() + chrono::Duration::days(2));

        assert_eq!(revoked.state, LicenseState::Revoked);
        assert_eq!(revoked.customer, None);
        assert_eq!(revoked.license_expires_at, None);
        assert_eq!(revoked.revoked_reason.as_deref(), Some("chargeback"));
        assert_eq!(revoked.activated_token, activated.activated_token);
    }

    #[test]
    fn record_json_roundtrip() {
        let record = LicenseRecord::trial(day0(), chrono::Duration::days(30));
        let token = decoded("parish-042", day0(), Some(day0() + chrono::Duration::days(365)));
        let activated = record.activated(&token, day0());

        let json = activated.to_json().unwrap();
        let restored = LicenseRecord::from_json(&json).unwrap();
        assert_eq!(restored, activated);
    }

    #[test]
    fn trial_record_omits_optional_fields_in_json() {
        let record = LicenseRecord::trial(day0(), chrono::Duration::days(30));
        let json = record.to_json().unwrap();
        assert!(!json.contains("license_expires_at"));
        assert!(!json.contains("activated_token"));
        assert!(!json.contains("revoked_reason"));
    }

    #[test]
    fn malformed_json_rejected() {
        let result = LicenseRecord::from_json("not json");
        assert!(matches!(
            result,
            Err(crate::BeadleError::StoreUnavailable(_))
        ));
    }
}
