//! Expiry arithmetic over the persisted record.
//!
//! Pure functions of the record and `now`: no persistence happens here.
//! The state machine decides whether an observed lapse gets written
//! through.

use crate::record::{LicenseRecord, LicenseState};
use chrono::{DateTime, Utc};

/// `days_remaining` sentinel for perpetual licenses.
pub const PERPETUAL_DAYS_REMAINING: i64 = i64::MAX;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Status derived from a record at a given instant.
///
/// The derived state may differ from the persisted one: an activated
/// record past its entitlement window evaluates as `Expired` before the
/// machine writes that transition through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveStatus {
    /// State in effect at the evaluation instant.
    pub state: LicenseState,

    /// The entitlement boundary that applies: the license expiry when
    /// activated, the trial expiry while in trial, `None` when
    /// perpetual or revoked.
    pub effective_expiry: Option<DateTime<Utc>>,

    /// Whole days until `effective_expiry`, rounded up and floored at 0.
    pub days_remaining: i64,
}

/// Days until `expires_at`, rounded up to whole days and floored at 0.
///
/// Reaches 0 exactly at the expiry instant, never goes negative.
pub fn days_remaining(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (expires_at - now).num_seconds();
    if seconds <= 0 {
        0
    } else {
        (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
    }
}

/// Evaluate the effective status of a record at `now`.
///
/// All comparisons are UTC; callers normalize before calling.
pub fn evaluate(record: &LicenseRecord, now: DateTime<Utc>) -> EffectiveStatus {
    match record.state {
        LicenseState::Trial => {
            let expiry = record.trial_expires_at;
            if now >= expiry {
                EffectiveStatus {
                    state: LicenseState::Expired,
                    effective_expiry: Some(expiry),
                    days_remaining: 0,
                }
            } else {
                EffectiveStatus {
                    state: LicenseState::Trial,
                    effective_expiry: Some(expiry),
                    days_remaining: days_remaining(expiry, now),
                }
            }
        }
        LicenseState::Activated => match record.license_expires_at {
            None => EffectiveStatus {
                state: LicenseState::Activated,
                effective_expiry: None,
                days_remaining: PERPETUAL_DAYS_REMAINING,
            },
            Some(expiry) => {
                if now >= expiry {
                    EffectiveStatus {
                        state: LicenseState::Expired,
                        effective_expiry: Some(expiry),
                        days_remaining: 0,
                    }
                } else {
                    EffectiveStatus {
                        state: LicenseState::Activated,
                        effective_expiry: Some(expiry),
                        days_remaining: days_remaining(expiry, now),
                    }
                }
            }
        },
        LicenseState::Expired => EffectiveStatus {
            state: LicenseState::Expired,
            effective_expiry: record.license_expires_at.or(Some(record.trial_expires_at)),
            days_remaining: 0,
        },
        LicenseState::Revoked => EffectiveStatus {
            state: LicenseState::Revoked,
            effective_expiry: None,
            days_remaining: 0,
        },
        // Reporting-only pseudo-state; never persisted.
        LicenseState::Invalid => EffectiveStatus {
            state: LicenseState::Invalid,
            effective_expiry: None,
            days_remaining: 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TokenFingerprint;
    use chrono::{Duration, TimeZone};

    fn day0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn trial_record() -> LicenseRecord {
        LicenseRecord::trial(day0(), Duration::days(30))
    }

    fn activated_record(expiry: Option<DateTime<Utc>>) -> LicenseRecord {
        LicenseRecord {
            version: 2,
            state: LicenseState::Activated,
            customer: Some("parish-042".to_string()),
            trial_expires_at: day0() + Duration::days(30),
            license_expires_at: expiry,
            activated_token: Some(TokenFingerprint {
                digest: "ab".repeat(32),
                issued_at: day0(),
            }),
            revoked_reason: None,
            last_checked_at: day0(),
        }
    }

    #[test]
    fn trial_counts_full_days() {
        let status = evaluate(&trial_record(), day0());
        assert_eq!(status.state, LicenseState::Trial);
        assert_eq!(status.days_remaining, 30);
        assert_eq!(status.effective_expiry, Some(day0() + Duration::days(30)));
    }

    #[test]
    fn trial_days_decrease_as_time_advances() {
        let record = trial_record();
        let mut previous = evaluate(&record, day0()).days_remaining;
        for day in 1..=30 {
            let current = evaluate(&record, day0() + Duration::days(day)).days_remaining;
            assert!(current < previous, "day {} did not decrease", day);
            previous = current;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn trial_partial_day_rounds_up() {
        let record = trial_record();
        let status = evaluate(&record, day0() + Duration::days(29) + Duration::hours(1));
        assert_eq!(status.days_remaining, 1);
    }

    #[test]
    fn trial_expires_exactly_at_boundary() {
        let record = trial_record();

        let just_before = evaluate(&record, day0() + Duration::days(30) - Duration::seconds(1));
        assert_eq!(just_before.state, LicenseState::Trial);
        assert_eq!(just_before.days_remaining, 1);

        let at_boundary = evaluate(&record, day0() + Duration::days(30));
        assert_eq!(at_boundary.state, LicenseState::Expired);
        assert_eq!(at_boundary.days_remaining, 0);
    }

    #[test]
    fn trial_never_goes_negative() {
        let record = trial_record();
        let status = evaluate(&record, day0() + Duration::days(400));
        assert_eq!(status.days_remaining, 0);
    }

    #[test]
    fn perpetual_activation_never_expires() {
        let record = activated_record(None);
        let status = evaluate(&record, day0() + Duration::days(10_000));
        assert_eq!(status.state, LicenseState::Activated);
        assert_eq!(status.days_remaining, PERPETUAL_DAYS_REMAINING);
        assert_eq!(status.effective_expiry, None);
    }

    #[test]
    fn dated_activation_counts_down() {
        let expiry = day0() + Duration::days(365);
        let record = activated_record(Some(expiry));

        let status = evaluate(&record, day0());
        assert_eq!(status.state, LicenseState::Activated);
        assert_eq!(status.days_remaining, 365);
    }

    #[test]
    fn dated_activation_lapses_without_persisting() {
        let expiry = day0() + Duration::days(365);
        let record = activated_record(Some(expiry));

        let status = evaluate(&record, expiry + Duration::days(1));
        assert_eq!(status.state, LicenseState::Expired);
        assert_eq!(status.days_remaining, 0);
        // The record itself is untouched; persistence is the machine's job.
        assert_eq!(record.state, LicenseState::Activated);
    }

    #[test]
    fn expired_trial_record_reports_trial_boundary() {
        let mut record = trial_record();
        record.state = LicenseState::Expired;

        let status = evaluate(&record, day0() + Duration::days(40));
        assert_eq!(status.state, LicenseState::Expired);
        assert_eq!(status.effective_expiry, Some(record.trial_expires_at));
    }

    #[test]
    fn expired_activated_record_reports_license_boundary() {
        let expiry = day0() + Duration::days(365);
        let mut record = activated_record(Some(expiry));
        record.state = LicenseState::Expired;

        let status = evaluate(&record, expiry + Duration::days(10));
        assert_eq!(status.effective_expiry, Some(expiry));
    }

    #[test]
    fn revoked_record_reports_zero_days() {
        let record = activated_record(None).revoked("chargeback", day0());
        let status = evaluate(&record, day0());
        assert_eq!(status.state, LicenseState::Revoked);
        assert_eq!(status.days_remaining, 0);
        assert_eq!(status.effective_expiry, None);
    }
}
