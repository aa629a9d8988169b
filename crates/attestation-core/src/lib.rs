//! # Attestation Core
//!
//! Domain types and pure functions for content provenance attestations.
//!
//! ## Key Concepts
//!
//! - **Content hash**: 32-byte digest identifying a piece of content; the primary key
//! - **Attestation record**: provenance claims bound to one content hash
//! - **Codec**: the canonical byte layout shared with the proving subsystem
//! - **Address**: versioned, deterministic storage slot for a content hash
//! - **Validation**: admission rules applied before anything is stored
//!
//! ## Invariants
//!
//! 1. **Binding**: a record is only admitted under the content hash it carries
//! 2. **Bounded**: every string field is at most 128 bytes
//! 3. **Write-once**: one attestation per address, never overwritten

pub mod address;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod record;
pub mod types;
pub mod validation;

pub use address::{derive_address, AddressVersion, AttestationAddress, DEFAULT_NAMESPACE};
pub use codec::{decode, encode, MAX_ENCODED_LEN};
pub use crypto::{
    KeyPair, OutputProof, PreVerified, ProofVerifier, PublicKey, SerializablePublicKey,
};
pub use error::{CodecError, HexDigestError, ProofError, ValidationError};
pub use record::{AttestationRecord, ContentHash, RecordField, MAX_STRING_LEN};
pub use types::{
    Attestation, PrincipalIdentifier, PrincipalType, ResourceBudget, SubmissionContext,
    SubmissionCost,
};
pub use validation::validate_record;
