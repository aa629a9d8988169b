//! Submission orchestrator
//!
//! Composes the codec, validator, proof verifier, address deriver and store
//! into the two operations callers see: `submit` and `query`. The service
//! holds no mutable state of its own; the store is the only shared resource.

mod error;
mod query;
mod submit;

pub use error::AttestationError;
pub use query::AttestationView;
pub use submit::{Committed, SubmissionResult};

use attestation_core::{
    derive_address, AttestationAddress, ContentHash, PreVerified, PrincipalIdentifier,
    ProofVerifier, ResourceBudget, SubmissionContext, SubmissionCost,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{ServiceConfig, VerificationMode};
use crate::keys::ProverKeyRegistry;
use crate::storage::{AttestationStore, MemoryStore};

/// The attestation service
///
/// Opened once at process start and closed at shutdown. Cheap to share
/// behind an `Arc`; every method takes `&self`.
#[derive(Debug)]
pub struct AttestationService {
    store: Arc<dyn AttestationStore>,
    verifier: Arc<dyn ProofVerifier>,
    /// Set when proofs are checked against our own registry
    registry: Option<Arc<ProverKeyRegistry>>,
    namespace: String,
    ceiling: ResourceBudget,
    authorized: Option<HashSet<PrincipalIdentifier>>,
}

impl AttestationService {
    /// Assemble a service from an already opened store and verifier
    pub fn new(
        store: Arc<dyn AttestationStore>,
        verifier: Arc<dyn ProofVerifier>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            store,
            verifier,
            registry: None,
            namespace: config.namespace.clone(),
            ceiling: config.budget,
            authorized: config.authorized_submitters.clone(),
        }
    }

    /// Open the backend and verifier named by `config`
    pub async fn open(config: &ServiceConfig) -> Result<Self, AttestationError> {
        let store = open_store(config).await?;

        let mut registry = None;
        let verifier: Arc<dyn ProofVerifier> = match config.verification {
            VerificationMode::Required => {
                let keys = ProverKeyRegistry::from_keys(&config.prover_keys)?;
                if keys.is_empty() {
                    warn!("No prover keys registered; every proof will be rejected until one is");
                }
                let keys = Arc::new(keys);
                registry = Some(Arc::clone(&keys));
                keys
            }
            VerificationMode::PreVerified => Arc::new(PreVerified::new()),
        };

        info!(
            namespace = %config.namespace,
            verification = ?config.verification,
            budget = config.budget.max_units,
            restricted = config.authorized_submitters.is_some(),
            "Attestation service opened"
        );

        let mut service = Self::new(store, verifier, config);
        service.registry = registry;
        Ok(service)
    }

    /// Release the backend
    pub async fn close(&self) -> Result<(), AttestationError> {
        self.store.close().await?;
        info!("Attestation service closed");
        Ok(())
    }

    /// Prover keys trusted by this service, when it verifies proofs itself
    pub fn prover_keys(&self) -> Option<&ProverKeyRegistry> {
        self.registry.as_deref()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Address a content hash is (or would be) stored at
    pub fn address_of(&self, content_hash: &ContentHash) -> AttestationAddress {
        derive_address(&self.namespace, content_hash)
    }

    /// Number of committed attestations
    pub async fn count(&self) -> Result<u64, AttestationError> {
        Ok(self.store.count().await?)
    }

    fn authorize(&self, submitter: &PrincipalIdentifier) -> Result<(), AttestationError> {
        match &self.authorized {
            Some(allowed) if !allowed.contains(submitter) => {
                warn!(submitter = %submitter, "SECURITY: submitter not on allow-list");
                Err(AttestationError::Unauthorized(format!(
                    "{} may not submit attestations",
                    submitter
                )))
            }
            _ => Ok(()),
        }
    }

    fn charge(
        &self,
        ctx: &SubmissionContext,
        proof_len: usize,
        outputs_len: usize,
    ) -> Result<SubmissionCost, AttestationError> {
        let cost = SubmissionCost::estimate(
            proof_len,
            outputs_len,
            self.verifier.performs_verification(),
        );
        let budget = ctx.budget.min(self.ceiling);

        if !cost.fits(&budget) {
            warn!(
                submitter = %ctx.submitter,
                required = cost.units,
                available = budget.max_units,
                "Submission exceeds resource budget"
            );
            return Err(AttestationError::ResourceExhausted {
                required: cost.units,
                available: budget.max_units,
            });
        }
        Ok(cost)
    }
}

#[cfg(feature = "postgres")]
async fn open_store(config: &ServiceConfig) -> Result<Arc<dyn AttestationStore>, AttestationError> {
    match &config.database_url {
        Some(url) => Ok(Arc::new(crate::storage::PostgresStore::new(url).await?)),
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

#[cfg(not(feature = "postgres"))]
async fn open_store(config: &ServiceConfig) -> Result<Arc<dyn AttestationStore>, AttestationError> {
    match &config.database_url {
        Some(_) => Err(crate::config::ConfigError::PostgresUnavailable.into()),
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use attestation_core::{KeyPair, SerializablePublicKey};

    #[tokio::test]
    async fn test_open_defaults_to_memory_with_registry() {
        let service = AttestationService::open(&ServiceConfig::default()).await.unwrap();

        assert_eq!(service.namespace(), "attestation");
        assert!(service.prover_keys().unwrap().is_empty());
        assert_eq!(service.count().await.unwrap(), 0);
        service.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_open_loads_configured_prover_keys() {
        let kp = KeyPair::generate("prover-1");
        let config = ServiceConfig {
            prover_keys: vec![(&kp.public_key()).into()],
            ..ServiceConfig::default()
        };

        let service = AttestationService::open(&config).await.unwrap();
        assert!(service.prover_keys().unwrap().contains("prover-1"));
    }

    #[tokio::test]
    async fn test_open_rejects_bad_prover_key() {
        let config = ServiceConfig {
            prover_keys: vec![SerializablePublicKey {
                kid: "prover-1".into(),
                key: "not base64!".into(),
            }],
            ..ServiceConfig::default()
        };

        let err = AttestationService::open(&config).await.unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
        match err {
            AttestationError::Config(ConfigError::InvalidProverKey { kid, reason }) => {
                assert_eq!(kid, "prover-1");
                assert!(!reason.is_empty());
            }
            other => panic!("expected InvalidProverKey, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_pre_verified_has_no_registry() {
        let config = ServiceConfig {
            verification: VerificationMode::PreVerified,
            ..ServiceConfig::default()
        };
        let service = AttestationService::open(&config).await.unwrap();
        assert!(service.prover_keys().is_none());
    }

    #[cfg(not(feature = "postgres"))]
    #[tokio::test]
    async fn test_database_url_without_feature() {
        let config = ServiceConfig {
            database_url: Some("postgres://localhost/attestations".into()),
            ..ServiceConfig::default()
        };
        let err = AttestationService::open(&config).await.unwrap_err();
        assert!(matches!(err, AttestationError::Config(ConfigError::PostgresUnavailable)));
    }

    #[test]
    fn test_address_follows_namespace() {
        let hash = ContentHash::sha256(b"sample");
        let store: Arc<dyn AttestationStore> = Arc::new(MemoryStore::new());
        let verifier: Arc<dyn ProofVerifier> = Arc::new(PreVerified::new());

        let a = AttestationService::new(store.clone(), verifier.clone(), &ServiceConfig::default());
        let b = AttestationService::new(
            store,
            verifier,
            &ServiceConfig {
                namespace: "staging".into(),
                ..ServiceConfig::default()
            },
        );

        assert_eq!(a.address_of(&hash), derive_address("attestation", &hash));
        assert_ne!(a.address_of(&hash), b.address_of(&hash));
    }
}
