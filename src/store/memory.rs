//! In-memory store backend.
//!
//! Holds the record behind a mutex. Used by tests and by embedders that
//! manage durability themselves.

use crate::record::LicenseRecord;
use crate::store::LicenseStore;
use crate::BeadleError;
use std::sync::Mutex;

/// In-memory license store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<LicenseRecord>>,
}

impl MemoryStore {
    /// Create an empty store (no record, as on first boot).
    pub fn new() -> Self {
        Self::default()
    }
}

impl LicenseStore for MemoryStore {
    fn load(&self) -> Result<Option<LicenseRecord>, BeadleError> {
        let guard = self
            .record
            .lock()
            .map_err(|_| BeadleError::StoreUnavailable("store lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn compare_and_replace(
        &self,
        expected_version: Option<u64>,
        record: &LicenseRecord,
    ) -> Result<(), BeadleError> {
        let mut guard = self
            .record
            .lock()
            .map_err(|_| BeadleError::StoreUnavailable("store lock poisoned".to_string()))?;

        if guard.as_ref().map(|r| r.version) != expected_version {
            return Err(BeadleError::StoreConflict);
        }

        *guard = Some(record.clone());
        Ok(())
    }
}
