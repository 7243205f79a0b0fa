//! Activation token claims.

use chrono::serde::{ts_seconds, ts_seconds_option};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The claims carried inside a verified activation token.
///
/// Claim names follow the issuing server's compact convention: `cus` for
/// the customer identifier, `iat`/`exp` as unix seconds. A missing `exp`
/// marks a perpetual entitlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Customer identifier this token licenses the deployment to.
    #[serde(rename = "cus")]
    pub customer: String,

    /// Issuance instant (unix seconds). Drives replay ordering and
    /// anti-rollback.
    #[serde(rename = "iat", with = "ts_seconds")]
    pub issued_at: DateTime<Utc>,

    /// End of the entitlement window (unix seconds); absent for
    /// perpetual tokens.
    #[serde(
        rename = "exp",
        with = "ts_seconds_option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn claims_parse_dated() {
        let json = r#"{"cus":"parish-042","iat":1740819600,"exp":1772355600}"#;
        let claims: TokenClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.customer, "parish-042");
        assert_eq!(
            claims.issued_at,
            Utc.timestamp_opt(1_740_819_600, 0).unwrap()
        );
        assert_eq!(
            claims.expires_at,
            Some(Utc.timestamp_opt(1_772_355_600, 0).unwrap())
        );
    }

    #[test]
    fn claims_parse_perpetual() {
        let json = r#"{"cus":"parish-042","iat":1740819600}"#;
        let claims: TokenClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.expires_at, None);
    }

    #[test]
    fn perpetual_claims_omit_exp_when_serialized() {
        let claims = TokenClaims {
            customer: "parish-042".to_string(),
            issued_at: Utc.timestamp_opt(1_740_819_600, 0).unwrap(),
            expires_at: None,
        };
        let json = serde_json::to_string(&claims).unwrap();
        assert!(!json.contains("exp"));
    }

    #[test]
    fn claims_missing_customer_rejected() {
        let json = r#"{"iat":1740819600}"#;
        assert!(serde_json::from_str::<TokenClaims>(json).is_err());
    }
}
