//! Prover Key Registry
//!
//! Holds the Ed25519 public keys of provers whose proofs the store accepts.
//! A proof names its key in the COSE protected header; the registry looks the
//! key up and checks the signature over the submitted public outputs.

use attestation_core::{OutputProof, ProofError, ProofVerifier, PublicKey, SerializablePublicKey};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::{info, warn};

use crate::config::ConfigError;

/// Thread-safe registry of trusted prover keys (kid -> key)
#[derive(Debug, Default)]
pub struct ProverKeyRegistry {
    prover_keys: RwLock<HashMap<String, PublicKey>>,
}

impl ProverKeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configured keys
    ///
    /// Fails on the first key that cannot be decoded, naming its kid.
    pub fn from_keys(keys: &[SerializablePublicKey]) -> Result<Self, ConfigError> {
        let registry = Self::new();
        for spk in keys {
            let key = PublicKey::try_from(spk.clone()).map_err(|e| ConfigError::InvalidProverKey {
                kid: spk.kid.clone(),
                reason: e.to_string(),
            })?;
            registry.register(key);
        }
        Ok(registry)
    }

    /// Register a prover's public key under its own kid
    pub fn register(&self, key: PublicKey) {
        let mut prover_keys = self.prover_keys.write().unwrap_or_else(PoisonError::into_inner);
        info!(kid = %key.kid(), "Registered prover key");
        prover_keys.insert(key.kid().to_string(), key);
    }

    pub fn get(&self, kid: &str) -> Option<PublicKey> {
        let prover_keys = self.prover_keys.read().unwrap_or_else(PoisonError::into_inner);
        prover_keys.get(kid).cloned()
    }

    pub fn contains(&self, kid: &str) -> bool {
        let prover_keys = self.prover_keys.read().unwrap_or_else(PoisonError::into_inner);
        prover_keys.contains_key(kid)
    }

    /// Remove a prover's key; later proofs under that kid are rejected
    pub fn unregister(&self, kid: &str) -> bool {
        let mut prover_keys = self.prover_keys.write().unwrap_or_else(PoisonError::into_inner);
        let removed = prover_keys.remove(kid).is_some();
        if removed {
            info!(kid = %kid, "Unregistered prover key");
        }
        removed
    }

    pub fn list_kids(&self) -> Vec<String> {
        let prover_keys = self.prover_keys.read().unwrap_or_else(PoisonError::into_inner);
        prover_keys.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        let prover_keys = self.prover_keys.read().unwrap_or_else(PoisonError::into_inner);
        prover_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProofVerifier for ProverKeyRegistry {
    fn verify(&self, proof: &[u8], public_outputs: &[u8]) -> Result<(), ProofError> {
        let proof = OutputProof::from_bytes(proof)?;
        let kid = proof.kid().ok_or(ProofError::MissingKeyId)?;

        let key = self.get(&kid).ok_or_else(|| {
            warn!(kid = %kid, "SECURITY: proof signed by unregistered prover");
            ProofError::UnknownProver(kid.clone())
        })?;

        key.verify_outputs(&proof, public_outputs)
    }
}
