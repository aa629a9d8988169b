//! Submission path
//!
//! Every check runs before the store is touched. The store's
//! create-if-absent commit is the last step and the only mutation.

use attestation_core::{
    codec, validate_record, AddressVersion, Attestation, AttestationAddress, ContentHash,
    SubmissionContext,
};
use tracing::{debug, info, warn};

use super::{AttestationError, AttestationService};

/// Result of a submission
pub type SubmissionResult = Result<Committed, AttestationError>;

/// A successful commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    pub address: AttestationAddress,
    /// Seconds since the Unix epoch, assigned by the store
    pub timestamp: i64,
    pub attestation: Attestation,
}

impl AttestationService {
    /// Submit a proven attestation for `content_hash`
    ///
    /// 1. Check the submitter against the allow-list
    /// 2. Charge the submission against the resource budget
    /// 3. Decode the public outputs into a record
    /// 4. Validate hash binding and field lengths
    /// 5. Verify the proof over the public outputs
    /// 6. Derive the address and commit, write-once
    ///
    /// A duplicate submission fails with [`AttestationError::AlreadyExists`]
    /// and leaves the stored attestation unchanged.
    pub async fn submit(
        &self,
        ctx: &SubmissionContext,
        content_hash: ContentHash,
        proof: &[u8],
        public_outputs: &[u8],
    ) -> SubmissionResult {
        // Step 1: Authorization
        self.authorize(&ctx.submitter)?;

        // Step 2: Resource budget
        let cost = self.charge(ctx, proof.len(), public_outputs.len())?;

        // Step 3: Decode
        let record = codec::decode(public_outputs).map_err(|e| {
            warn!(content_hash = %content_hash, error = %e, "Rejected malformed record");
            AttestationError::MalformedRecord(e)
        })?;

        // Step 4: Validate against the declared hash
        validate_record(&content_hash, &record)?;

        // Step 5: Proof verification
        self.verifier.verify(proof, public_outputs).map_err(|e| {
            warn!(
                content_hash = %content_hash,
                submitter = %ctx.submitter,
                error = %e,
                "SECURITY: proof verification failed"
            );
            AttestationError::ProofVerificationFailed(e)
        })?;

        // Step 6: Derive address and commit
        let version = AddressVersion::CURRENT;
        let address = version.derive(&self.namespace, &content_hash);
        debug!(address = %address, units = cost.units, "Committing attestation");

        let attestation = self
            .store
            .commit(address, version, record, ctx.submitter.clone())
            .await?;

        info!(
            address = %address,
            content_hash = %content_hash,
            submitter = %ctx.submitter,
            timestamp = attestation.timestamp,
            "Attestation committed"
        );

        Ok(Committed {
            address,
            timestamp: attestation.timestamp,
            attestation,
        })
    }
}
