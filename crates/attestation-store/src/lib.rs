//! Attestation Store
//!
//! Write-once store for content provenance attestations, and the service
//! that admits them:
//! - Decodes the proven public outputs into a record
//! - Rejects records not bound to the declared content hash
//! - Verifies the proof against registered prover keys
//! - Commits at most one attestation per content hash
//!
//! ## Guarantees
//!
//! 1. **Validate before write**: the store is only touched with validated data
//! 2. **Write-once**: of N concurrent submissions for one hash, exactly one commits
//! 3. **No overwrite**: a duplicate gets `AlreadyExists` and the first commit stays
//!
//! ## Operations
//!
//! - [`AttestationService::submit`] - Admit and commit an attestation
//! - [`AttestationService::query`] - Look up the attestation for a content hash
//! - [`AttestationService::query_address`] - Look up by storage address

pub mod config;
pub mod keys;
pub mod service;
pub mod storage;
pub mod telemetry;

pub use config::{ConfigError, ServiceConfig, VerificationMode};
pub use keys::ProverKeyRegistry;
pub use service::{
    AttestationError, AttestationService, AttestationView, Committed, SubmissionResult,
};
#[cfg(feature = "postgres")]
pub use storage::PostgresStore;
pub use storage::{AttestationStore, MemoryStore, StorageError};
pub use telemetry::init_tracing;
