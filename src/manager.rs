//! License Manager - the main public API.
//!
//! The `LicenseManager` answers "is this deployment licensed right now"
//! and processes activation tokens:
//! - `status()` never fails: a store outage degrades to the `invalid`
//!   state instead of erroring every protected request
//! - `activate()` is conservative: replayed and rolled-back tokens are
//!   rejected with distinct kinds, and persistence failures are loud
//! - expiry is detected lazily on the next `status()` call; no
//!   background timers are involved

use crate::clock::{Clock, SystemClock};
use crate::config::BeadleConfig;
use crate::expiry;
use crate::record::{LicenseRecord, LicenseState};
use crate::report::{self, LicenseStatus};
use crate::store::{FileStore, LicenseStore};
use crate::token;
use crate::BeadleError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Main license state machine.
///
/// Create one instance per deployment and reuse it for all checks; the
/// record itself lives in the store, so the manager carries no mutable
/// state of its own.
pub struct LicenseManager {
    config: BeadleConfig,
    clock: Arc<dyn Clock>,
    store: Arc<dyn LicenseStore>,
}

impl LicenseManager {
    /// Create a manager backed by the default file store.
    ///
    /// Uses the system clock for time operations.
    ///
    /// # Errors
    /// Returns an error if configuration validation fails or the store
    /// directory cannot be created.
    pub fn new(config: BeadleConfig) -> Result<Self, BeadleError> {
        config.validate()?;
        let store: Arc<dyn LicenseStore> = Arc::new(FileStore::new(config.store_namespace)?);
        Ok(Self {
            config,
            clock: Arc::new(SystemClock),
            store,
        })
    }

    /// Create a manager backed by a caller-supplied store.
    pub fn with_store(
        config: BeadleConfig,
        store: Arc<dyn LicenseStore>,
    ) -> Result<Self, BeadleError> {
        config.validate()?;
        Ok(Self {
            config,
            clock: Arc::new(SystemClock),
            store,
        })
    }

    /// Create a manager with a custom store and clock (for testing).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn with_parts(
        config: BeadleConfig,
        store: Arc<dyn LicenseStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, BeadleError> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            store,
        })
    }

    /// Current license status.
    ///
    /// Reads the record (initializing the trial on first boot), derives
    /// the effective state, persists a newly observed lapse exactly once,
    /// and renders the outward payload. Never fails: a store failure
    /// yields the `invalid` state with a diagnostic message.
    pub fn status(&self) -> LicenseStatus {
        let now = self.clock.now_utc();

        loop {
            let record = match self.load_or_init(now) {
                Ok(record) => record,
                Err(e) => {
                    warn!(error = %e, "license store unreadable");
                    return report::unreadable(&e.to_string());
                }
            };

            let effective = expiry::evaluate(&record, now);

            // Lazy lapse write-through: persist the first observation of an
            // expired trial or activation.
            if effective.state == LicenseState::Expired
                && matches!(record.state, LicenseState::Trial | LicenseState::Activated)
            {
                let expired = record.expired(now);
                match self
                    .store
                    .compare_and_replace(Some(record.version), &expired)
                {
                    Ok(()) => {
                        info!(prior = ?record.state, "license lapse persisted");
                        return report::render(&expired, &effective);
                    }
                    // Another thread wrote first; re-read and re-evaluate.
                    Err(BeadleError::StoreConflict) => continue,
                    Err(e) => {
                        // The expired decision derives from the record and
                        // clock alone; a write outage must not flip a
                        // readable deployment to invalid.
                        warn!(error = %e, "failed to persist observed lapse");
                        return report::render(&record, &effective);
                    }
                }
            }

            debug!(
                state = ?effective.state,
                days_remaining = effective.days_remaining,
                "license status evaluated"
            );
            return report::render(&record, &effective);
        }
    }

    /// Apply an activation token.
    ///
    /// # Errors
    /// - [`BeadleError::InvalidToken`] - malformed, badly signed, or
    ///   future-dated token
    /// - [`BeadleError::TokenAlreadyApplied`] - the identical token is
    ///   already in effect (callers may treat as already-licensed)
    /// - [`BeadleError::TokenOlderThanCurrent`] - issued before the
    ///   currently applied token (anti-rollback)
    /// - [`BeadleError::DeploymentRevoked`] - activation over a revoked
    ///   record
    /// - [`BeadleError::StoreUnavailable`] - the record could not be read
    /// - [`BeadleError::ActivationPersistFailed`] - the activation could
    ///   not be written
    pub fn activate(&self, token_str: &str) -> Result<LicenseStatus, BeadleError> {
        let now = self.clock.now_utc();
        let decoded = token::decode(
            token_str,
            self.config.verify_key_hex,
            now,
            self.config.clock_skew_tolerance,
        )?;

        loop {
            let record = self.load_or_init(now)?;

            if record.state == LicenseState::Revoked {
                return Err(BeadleError::DeploymentRevoked);
            }

            if let Some(applied) = &record.activated_token {
                if applied.digest == decoded.fingerprint {
                    return Err(BeadleError::TokenAlreadyApplied);
                }
                if decoded.claims.issued_at < applied.issued_at {
                    return Err(BeadleError::TokenOlderThanCurrent);
                }
            }

            let activated = record.activated(&decoded, now);
            match self
                .store
                .compare_and_replace(Some(record.version), &activated)
            {
                Ok(()) => {
                    info!(customer = %decoded.claims.customer, "activation applied");
                    let effective = expiry::evaluate(&activated, now);
                    return Ok(report::render(&activated, &effective));
                }
                // A racing writer won; re-read and re-run the checks, so
                // the loser observes TokenAlreadyApplied or
                // TokenOlderThanCurrent against the winner's record.
                Err(BeadleError::StoreConflict) => continue,
                Err(e) => return Err(BeadleError::ActivationPersistFailed(e.to_string())),
            }
        }
    }

    /// Revoke the deployment's license.
    ///
    /// Administrative path for the external billing system (chargebacks);
    /// never triggered by end-user requests. The token fingerprint is
    /// kept so the revoked token cannot be rolled back in later.
    ///
    /// # Errors
    /// [`BeadleError::StoreUnavailable`] when the record cannot be read
    /// or written.
    pub fn revoke(&self, reason: &str) -> Result<LicenseStatus, BeadleError> {
        let now = self.clock.now_utc();

        loop {
            let record = self.load_or_init(now)?;
            let revoked = record.revoked(reason, now);
            match self
                .store
                .compare_and_replace(Some(record.version), &revoked)
            {
                Ok(()) => {
                    warn!(reason = %reason, "license revoked");
                    let effective = expiry::evaluate(&revoked, now);
                    return Ok(report::render(&revoked, &effective));
                }
                Err(BeadleError::StoreConflict) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &BeadleConfig {
        &self.config
    }

    /// Read the record, initializing the trial on first boot.
    ///
    /// The trial window is set exactly once here; activation never
    /// touches it.
    fn load_or_init(&self, now: DateTime<Utc>) -> Result<LicenseRecord, BeadleError> {
        loop {
            if let Some(record) = self.store.load()? {
                return Ok(record);
            }

            let record = LicenseRecord::trial(now, self.trial_length());
            match self.store.compare_and_replace(None, &record) {
                Ok(()) => {
                    info!(trial_expires_at = %record.trial_expires_at, "trial record initialized");
                    return Ok(record);
                }
                // Another thread initialized first; read its record.
                Err(BeadleError::StoreConflict) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn trial_length(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.config.trial_length.as_secs() as i64)
    }
}
