//! In-memory storage backend
//!
//! Default storage implementation using a hashmap behind a lock.
//! Suitable for development and single-instance deployments.
//! Data is lost on restart.

use async_trait::async_trait;
use attestation_core::{
    AddressVersion, Attestation, AttestationAddress, AttestationRecord, PrincipalIdentifier,
};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, info, warn};

use super::{AttestationStore, StorageError};

/// In-memory attestation store
#[derive(Debug, Default)]
pub struct MemoryStore {
    attestations: RwLock<HashMap<AttestationAddress, Attestation>>,
}

impl MemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttestationStore for MemoryStore {
    async fn commit(
        &self,
        address: AttestationAddress,
        version: AddressVersion,
        record: AttestationRecord,
        submitted_by: PrincipalIdentifier,
    ) -> Result<Attestation, StorageError> {
        // Check and insert under one write lock
        let mut attestations = self.attestations.write().map_err(|_| StorageError::LockPoisoned)?;

        match attestations.entry(address) {
            Entry::Occupied(_) => {
                warn!(address = %address, "Attestation slot already taken");
                Err(StorageError::AlreadyExists(address))
            }
            Entry::Vacant(slot) => {
                let attestation = Attestation {
                    record,
                    submitted_by,
                    timestamp: chrono::Utc::now().timestamp(),
                    address_version: version,
                };
                info!(
                    address = %address,
                    content_hash = %attestation.record.content_hash,
                    submitted_by = %attestation.submitted_by,
                    "Committed attestation"
                );
                slot.insert(attestation.clone());
                Ok(attestation)
            }
        }
    }

    async fn get(&self, address: &AttestationAddress) -> Result<Option<Attestation>, StorageError> {
        let attestations = self.attestations.read().map_err(|_| StorageError::LockPoisoned)?;
        let found = attestations.get(address).cloned();
        debug!(address = %address, found = found.is_some(), "Attestation lookup");
        Ok(found)
    }

    async fn count(&self) -> Result<u64, StorageError> {
        let attestations = self.attestations.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(attestations.len() as u64)
    }
}
