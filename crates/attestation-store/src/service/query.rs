//! Lookup path

use attestation_core::{Attestation, AttestationAddress, ContentHash};
use serde::Serialize;
use tracing::debug;

use super::{AttestationError, AttestationService};

impl AttestationService {
    /// Fetch the attestation committed for `content_hash`
    pub async fn query(&self, content_hash: &ContentHash) -> Result<Attestation, AttestationError> {
        let address = self.address_of(content_hash);
        self.store.get(&address).await?.ok_or_else(|| {
            debug!(content_hash = %content_hash, "No attestation for content hash");
            AttestationError::NotFound(content_hash.to_hex())
        })
    }

    /// Fetch by address, for callers holding an address from a prior commit
    pub async fn query_address(
        &self,
        address: &AttestationAddress,
    ) -> Result<Attestation, AttestationError> {
        self.store
            .get(address)
            .await?
            .ok_or_else(|| AttestationError::NotFound(address.to_hex()))
    }
}

/// Presentation of a committed attestation for the query layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttestationView {
    /// Hex content hash
    pub content_hash: String,
    pub has_provenance_marker: bool,
    pub trust_list_match: String,
    pub validation_state: String,
    pub source_type: String,
    pub issuer: String,
    pub common_name: String,
    pub software_agent: String,
    pub signing_time: String,
    pub cert_fingerprint: String,
    /// `type:value`
    pub submitted_by: String,
    pub timestamp: i64,
}

impl From<&Attestation> for AttestationView {
    fn from(attestation: &Attestation) -> Self {
        let record = &attestation.record;
        Self {
            content_hash: record.content_hash.to_hex(),
            has_provenance_marker: record.has_provenance_marker,
            trust_list_match: record.trust_list_match.clone(),
            validation_state: record.validation_state.clone(),
            source_type: record.source_type.clone(),
            issuer: record.issuer.clone(),
            common_name: record.common_name.clone(),
            software_agent: record.software_agent.clone(),
            signing_time: record.signing_time.clone(),
            cert_fingerprint: record.cert_fingerprint.clone(),
            submitted_by: attestation.submitted_by.to_string(),
            timestamp: attestation.timestamp,
        }
    }
}
