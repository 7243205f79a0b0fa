//! File-based store backend with atomic writes.
//!
//! Persists the record as `license.json` under
//! `dirs::data_dir()/<namespace>/`. Writes go through a temp file +
//! rename so a crash mid-write never leaves a torn record, and an
//! in-process mutex serializes the read-compare-write window of
//! `compare_and_replace`.

use crate::record::LicenseRecord;
use crate::store::LicenseStore;
use crate::BeadleError;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

const RECORD_FILE: &str = "license.json";

/// File-based license store.
pub struct FileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a file store under `dirs::data_dir()/<namespace>/`.
    pub fn new(namespace: &str) -> Result<Self, BeadleError> {
        let base_dir = dirs::data_dir()
            .ok_or_else(|| BeadleError::StoreUnavailable("Could not find data directory".to_string()))?;
        Self::at_path(base_dir.join(namespace))
    }

    /// Create a file store at a specific directory.
    pub fn at_path(dir: PathBuf) -> Result<Self, BeadleError> {
        fs::create_dir_all(&dir)
            .map_err(|e| BeadleError::StoreUnavailable(format!("Failed to create store dir: {}", e)))?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn record_path(&self) -> PathBuf {
        self.dir.join(RECORD_FILE)
    }

    fn read_record(&self) -> Result<Option<LicenseRecord>, BeadleError> {
        let path = self.record_path();
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .map_err(|e| BeadleError::StoreUnavailable(format!("Failed to read record: {}", e)))?;

        Ok(Some(LicenseRecord::from_json(&json)?))
    }
}

impl LicenseStore for FileStore {
    fn load(&self) -> Result<Option<LicenseRecord>, BeadleError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| BeadleError::StoreUnavailable("store lock poisoned".to_string()))?;
        self.read_record()
    }

    fn compare_and_replace(
        &self,
        expected_version: Option<u64>,
        record: &LicenseRecord,
    ) -> Result<(), BeadleError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| BeadleError::StoreUnavailable("store lock poisoned".to_string()))?;

        let current = self.read_record()?;
        if current.as_ref().map(|r| r.version) != expected_version {
            return Err(BeadleError::StoreConflict);
        }

        let json = record.to_json()?;
        let target_path = self.record_path();
        let temp_path = self.dir.join(format!("{}.tmp", RECORD_FILE));

        fs::write(&temp_path, &json)
            .map_err(|e| BeadleError::StoreUnavailable(format!("Failed to write temp file: {}", e)))?;

        fs::rename(&temp_path, &target_path)
            .map_err(|e| BeadleError::StoreUnavailable(format!("Failed to rename record file: {}", e)))?;

        debug!(version = record.version, state = ?record.state, "license record persisted");
        Ok(())
    }
}
