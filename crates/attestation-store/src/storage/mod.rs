//! Storage abstraction for committed attestations
//!
//! The store is write-once: `commit` creates a slot only if it is empty, and
//! nothing updates or deletes a slot afterwards. Backends provide the
//! create-if-absent primitive atomically; that primitive is the single point
//! of serialization between concurrent submissions for the same content.
//!
//! - `MemoryStore`: in-process map, default
//! - `PostgresStore`: durable, behind the `postgres` feature

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

use async_trait::async_trait;
use attestation_core::{
    AddressVersion, Attestation, AttestationAddress, AttestationRecord, PrincipalIdentifier,
};
use std::fmt::Debug;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Attestation already exists at {0}")]
    AlreadyExists(AttestationAddress),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Write-once keyed storage for attestations
///
/// Implementations must be thread-safe. `timestamp` and `submitted_by` on the
/// returned [`Attestation`] are assigned here, never taken from the record.
#[async_trait]
pub trait AttestationStore: Send + Sync + Debug {
    /// Create the slot at `address` if and only if it is empty
    ///
    /// Returns [`StorageError::AlreadyExists`] without touching the existing
    /// attestation when the slot is taken.
    async fn commit(
        &self,
        address: AttestationAddress,
        version: AddressVersion,
        record: AttestationRecord,
        submitted_by: PrincipalIdentifier,
    ) -> Result<Attestation, StorageError>;

    /// Fetch the attestation at `address`
    async fn get(&self, address: &AttestationAddress) -> Result<Option<Attestation>, StorageError>;

    /// Number of committed attestations
    async fn count(&self) -> Result<u64, StorageError>;

    /// Release backend resources
    async fn close(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
