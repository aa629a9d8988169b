//! Proof verification seam and prover-key primitives
//!
//! A submission carries an opaque proof alongside its encoded public outputs.
//! This crate does not know how the proof was produced; it only defines the
//! [`ProofVerifier`] contract and one concrete proof format:
//!
//! - `OutputProof`: a COSE_Sign1 structure signed with an Ed25519 prover key,
//!   whose payload is the encoded public outputs byte-for-byte and whose
//!   protected header names the key.
//! - `KeyPair`: Ed25519 key pair held by a prover
//! - `PublicKey`: Ed25519 public key registered with the store

use coset::{
    iana, CborSerializable, CoseSign1, CoseSign1Builder, HeaderBuilder, TaggedCborSerializable,
};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::warn;

use crate::error::ProofError;

/// COSE algorithm identifier for EdDSA (Ed25519)
const EDDSA_ALG: iana::Algorithm = iana::Algorithm::EdDSA;

/// Decides whether `proof` is a valid witness for `public_outputs`
///
/// Verification is bounded and synchronous; implementations must not block
/// on the network.
pub trait ProofVerifier: Send + Sync + Debug {
    fn verify(&self, proof: &[u8], public_outputs: &[u8]) -> Result<(), ProofError>;

    /// Whether `verify` does real work (charged to the submitter's budget)
    fn performs_verification(&self) -> bool {
        true
    }
}

/// Verifier for deployments where proofs are checked before submission
///
/// Accepts every proof without inspecting it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreVerified;

impl PreVerified {
    pub fn new() -> Self {
        warn!("Proof verification disabled: proofs are trusted as pre-verified");
        Self
    }
}

impl ProofVerifier for PreVerified {
    fn verify(&self, _proof: &[u8], _public_outputs: &[u8]) -> Result<(), ProofError> {
        Ok(())
    }

    fn performs_verification(&self) -> bool {
        false
    }
}

/// COSE_Sign1 proof over encoded public outputs
#[derive(Debug, Clone)]
pub struct OutputProof {
    cose: CoseSign1,
}

impl OutputProof {
    /// Key ID from the protected header
    pub fn kid(&self) -> Option<String> {
        let kid = &self.cose.protected.header.key_id;
        if kid.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(kid).to_string())
        }
    }

    pub fn signature(&self) -> &[u8] {
        &self.cose.signature
    }

    /// The signed public outputs
    pub fn payload(&self) -> Option<&[u8]> {
        self.cose.payload.as_deref()
    }

    /// Serialize to untagged CBOR bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProofError> {
        self.cose.clone().to_vec().map_err(ProofError::from)
    }

    /// Parse tagged or untagged COSE_Sign1 bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProofError> {
        let cose = CoseSign1::from_tagged_slice(bytes)
            .or_else(|_| CoseSign1::from_slice(bytes))
            .map_err(ProofError::from)?;
        Ok(Self { cose })
    }
}

/// Ed25519 key pair used by a prover to sign public outputs
#[derive(Clone)]
pub struct KeyPair {
    kid: String,
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("kid", &self.kid)
            .field("verifying_key", &"[redacted]")
            .finish()
    }
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate(kid: impl Into<String>) -> Self {
        Self::from_signing_key(kid, SigningKey::generate(&mut OsRng))
    }

    pub fn from_signing_key(kid: impl Into<String>, signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            kid: kid.into(),
            signing_key,
            verifying_key,
        }
    }

    /// Create a key pair from a raw 32-byte secret
    pub fn from_bytes(kid: impl Into<String>, bytes: &[u8; 32]) -> Self {
        Self::from_signing_key(kid, SigningKey::from_bytes(bytes))
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            kid: self.kid.clone(),
            verifying_key: self.verifying_key,
        }
    }

    /// Sign encoded public outputs, embedding them as the COSE payload
    pub fn sign_outputs(&self, public_outputs: &[u8]) -> Result<OutputProof, ProofError> {
        let protected = HeaderBuilder::new()
            .algorithm(EDDSA_ALG)
            .key_id(self.kid.as_bytes().to_vec())
            .build();

        let cose = CoseSign1Builder::new()
            .protected(protected)
            .payload(public_outputs.to_vec())
            .try_create_signature(&[], |data| {
                Ok::<_, ProofError>(self.signing_key.sign(data).to_bytes().to_vec())
            })?
            .build();

        Ok(OutputProof { cose })
    }
}

/// Ed25519 public key of a registered prover
#[derive(Clone)]
pub struct PublicKey {
    kid: String,
    verifying_key: VerifyingKey,
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKey").field("kid", &self.kid).finish()
    }
}

impl PublicKey {
    pub fn from_bytes(kid: impl Into<String>, bytes: &[u8; 32]) -> Result<Self, ProofError> {
        let verifying_key =
            VerifyingKey::from_bytes(bytes).map_err(|e| ProofError::Crypto(e.to_string()))?;
        Ok(Self {
            kid: kid.into(),
            verifying_key,
        })
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Check that `proof` signs exactly `public_outputs` with this key
    pub fn verify_outputs(
        &self,
        proof: &OutputProof,
        public_outputs: &[u8],
    ) -> Result<(), ProofError> {
        let cose = &proof.cose;

        let kid = &cose.protected.header.key_id;
        if !kid.is_empty() {
            let kid_str = String::from_utf8_lossy(kid);
            if kid_str != self.kid {
                return Err(ProofError::InvalidSignature(format!(
                    "key ID mismatch: expected '{}', got '{}'",
                    self.kid, kid_str
                )));
            }
        }

        if proof.payload() != Some(public_outputs) {
            return Err(ProofError::PayloadMismatch);
        }

        let signature_bytes: [u8; 64] = cose
            .signature
            .as_slice()
            .try_into()
            .map_err(|_| ProofError::InvalidSignature("invalid signature length".into()))?;
        let signature = Signature::from_bytes(&signature_bytes);

        self.verifying_key
            .verify(&cose.tbs_data(&[]), &signature)
            .map_err(ProofError::from)
    }
}

/// Serializable public key for configuration and transmission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializablePublicKey {
    pub kid: String,
    /// Base64-encoded public key bytes
    pub key: String,
}

impl From<&PublicKey> for SerializablePublicKey {
    fn from(pk: &PublicKey) -> Self {
        use base64::{engine::general_purpose::STANDARD, Engine};
        Self {
            kid: pk.kid.clone(),
            key: STANDARD.encode(pk.to_bytes()),
        }
    }
}

impl TryFrom<SerializablePublicKey> for PublicKey {
    type Error = ProofError;

    fn try_from(spk: SerializablePublicKey) -> Result<Self, Self::Error> {
        use base64::{engine::general_purpose::STANDARD, Engine};
        let bytes = STANDARD
            .decode(&spk.key)
            .map_err(|e| ProofError::Crypto(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ProofError::Crypto("invalid key length".into()))?;
        PublicKey::from_bytes(spk.kid, &bytes)
    }
}
