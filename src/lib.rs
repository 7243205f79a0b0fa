//! # Beadle
//!
//! **Embedded license validation and activation for self-hosted deployments.**
//!
//! Beadle decides, for every protected request, whether a deployment is
//! licensed, in trial, expired, or invalid, and processes **Ed25519-signed
//! activation tokens** to move a deployment between those states.
//!
//! ## Features
//!
//! - **Ed25519 token verification** — tokens are signed by the billing
//!   system's private key; only the verification key ships with the app
//! - **Trial bootstrapping** — first boot starts a time-boxed trial,
//!   immutable thereafter
//! - **Lazy expiry** — lapses are detected and persisted on the next
//!   status check; no background timers
//! - **Replay and rollback rejection** — a fingerprint of the applied
//!   token refuses duplicates and older re-issues
//! - **Conservative failure modes** — an unreadable store degrades
//!   status checks to `invalid` instead of failing them, while a dropped
//!   activation write fails loudly
//!
//! ## Quickstart
//!
//! ```no_run
//! use beadle::{BeadleConfig, LicenseManager};
//! use std::time::Duration;
//!
//! fn main() -> Result<(), beadle::BeadleError> {
//!     let config = BeadleConfig {
//!         trial_length: Duration::from_secs(30 * 24 * 60 * 60), // 30 days
//!         verify_key_hex: "your-ed25519-verify-key-hex",
//!         clock_skew_tolerance: Duration::from_secs(60),
//!         store_namespace: "myapp-license",
//!     };
//!
//!     let manager = LicenseManager::new(config)?;
//!
//!     let status = manager.status();
//!     if status.allows_access() {
//!         println!("{}", status.message);
//!     }
//!
//!     // On token submission from the request layer:
//!     let status = manager.activate("lt1.eyJjdXMiOi4uLg.c2lnbmF0dXJl")?;
//!     println!("{}", status.message);
//!     Ok(())
//! }
//! ```
//!
//! ## Threat Model
//!
//! Beadle protects against:
//! - **Forged tokens** — claims are trusted only after Ed25519
//!   verification against the embedded key
//! - **Token replay** — re-submitting the applied token is rejected as
//!   already applied
//! - **Rollback** — a token issued before the applied one is refused,
//!   even if its expiry is later
//!
//! Beadle does **not** prevent binary patching or clock manipulation on
//! the host. Client-side licensing can always be bypassed by a
//! determined attacker with access to the machine.
//!
//! ## Configuration
//!
//! - `trial_length` — trial window started at first boot
//! - `verify_key_hex` — Ed25519 verification key (64 hex chars)
//! - `clock_skew_tolerance` — how far in the future a token's issuance
//!   timestamp may sit before it is rejected
//! - `store_namespace` — data directory namespace for the license record
//!
//! See [`BeadleConfig`] for full documentation.

#![deny(warnings)]
#![deny(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Data model
pub mod record;

// Token codec
pub mod token;

// Expiry arithmetic
pub mod expiry;

// Store layer
pub mod store;

// Status rendering
pub mod report;

// Manager (main public API)
pub mod manager;

// Re-exports for public API
pub use clock::{Clock, SystemClock};
pub use config::BeadleConfig;
pub use errors::BeadleError;
pub use expiry::PERPETUAL_DAYS_REMAINING;
pub use manager::LicenseManager;
pub use record::{LicenseRecord, LicenseState};
pub use report::LicenseStatus;
pub use store::{FileStore, LicenseStore, MemoryStore};

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
