//! License record persistence.
//!
//! A store holds the single license record for a deployment and offers a
//! version-checked replace so concurrent writers cannot interleave into a
//! corrupted record: exactly one of two racing writes wins, the other
//! observes a conflict and re-reads.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::record::LicenseRecord;
use crate::BeadleError;

/// Atomic persistence for the deployment's license record.
pub trait LicenseStore: Send + Sync {
    /// Read the current record, `None` before first initialization.
    ///
    /// # Errors
    /// [`BeadleError::StoreUnavailable`] when the backing medium cannot
    /// be read or holds an unreadable record.
    fn load(&self) -> Result<Option<LicenseRecord>, BeadleError>;

    /// Replace the record if the stored version matches `expected_version`.
    ///
    /// `None` asserts that no record exists yet (first boot).
    ///
    /// # Errors
    /// [`BeadleError::StoreConflict`] when another writer got there
    /// first; [`BeadleError::StoreUnavailable`] on I/O failure.
    fn compare_and_replace(
        &self,
        expected_version: Option<u64>,
        record: &LicenseRecord,
    ) -> Result<(), BeadleError>;
}
