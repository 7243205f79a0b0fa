//! Rendering internal state into the outward status payload.
//!
//! Message text is fully determined by the state, so the whole mapping
//! is testable as a state-to-message table. Free-form text never leaks
//! into the payload.

use crate::expiry::EffectiveStatus;
use crate::record::{LicenseRecord, LicenseState};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// The externally visible license status payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LicenseStatus {
    /// Effective state at evaluation time.
    pub state: LicenseState,

    /// Human-readable, state-determined message.
    pub message: String,

    /// Licensed customer, once activated.
    pub customer: Option<String>,

    /// End of the licensed entitlement window; `None` while in trial and
    /// for perpetual licenses.
    pub expires_at: Option<DateTime<Utc>>,

    /// End of the trial window; `None` only when the state is unreadable.
    pub trial_expires_at: Option<DateTime<Utc>>,

    /// Whole days until the effective expiry; `i64::MAX` for perpetual.
    pub days_remaining: i64,
}

impl LicenseStatus {
    /// Whether protected requests should be served in this state.
    pub fn allows_access(&self) -> bool {
        matches!(self.state, LicenseState::Trial | LicenseState::Activated)
    }
}

fn format_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Render a record plus its effective status into the outward payload.
pub(crate) fn render(record: &LicenseRecord, effective: &EffectiveStatus) -> LicenseStatus {
    let customer_label = record.customer.as_deref().unwrap_or("unknown");

    let message = match effective.state {
        LicenseState::Trial => {
            format!("Trial — {} days remaining", effective.days_remaining)
        }
        LicenseState::Activated => match record.license_expires_at {
            None => format!("Licensed to {}", customer_label),
            Some(expiry) => {
                format!("Licensed to {} until {}", customer_label, format_date(expiry))
            }
        },
        LicenseState::Expired => {
            let boundary = effective.effective_expiry.unwrap_or(record.trial_expires_at);
            format!(
                "License expired on {}; activate to continue",
                format_date(boundary)
            )
        }
        LicenseState::Revoked => {
            format!(
                "License revoked: {}",
                record.revoked_reason.as_deref().unwrap_or("unspecified")
            )
        }
        LicenseState::Invalid => "License state unreadable: unknown".to_string(),
    };

    LicenseStatus {
        state: effective.state,
        message,
        customer: record.customer.clone(),
        expires_at: record.license_expires_at,
        trial_expires_at: Some(record.trial_expires_at),
        days_remaining: effective.days_remaining,
    }
}

/// Render the degraded status for an unreadable store.
pub(crate) fn unreadable(diagnostic: &str) -> LicenseStatus {
    LicenseStatus {
        state: LicenseState::Invalid,
        message: format!("License state unreadable: {}", diagnostic),
        customer: None,
        expires_at: None,
        trial_expires_at: None,
        days_remaining: 0,
    }
}
