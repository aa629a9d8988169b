//! Error types for attestation records, proofs and validation

use thiserror::Error;

use crate::record::RecordField;

/// Errors raised while decoding the canonical record layout
///
/// Every variant surfaces to callers as a malformed record; the variants
/// only exist so logs can say where the buffer went wrong.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Buffer ended before a declared length was satisfied
    #[error("truncated at {field}: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        field: &'static str,
        needed: u64,
        remaining: usize,
    },

    /// Boolean byte was neither 0 nor 1
    #[error("invalid boolean byte {0:#04x} for has_provenance_marker")]
    InvalidBool(u8),

    /// String bytes were not valid UTF-8
    #[error("field {field} is not valid UTF-8")]
    InvalidUtf8 { field: RecordField },

    /// Bytes left over after the last field
    #[error("{count} trailing bytes after record")]
    TrailingBytes { count: usize },
}

/// Reasons a decoded record is refused before it reaches storage
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The record describes different content than the caller declared
    #[error("content hash mismatch: declared {declared}, record carries {decoded}")]
    ContentHashMismatch { declared: String, decoded: String },

    /// A bounded string field exceeds the record limit
    #[error("field {field} is {len} bytes, maximum is {max}")]
    StringTooLong {
        field: RecordField,
        len: usize,
        max: usize,
    },
}

/// Proof verification failures
#[derive(Error, Debug, Clone)]
pub enum ProofError {
    /// Proof could not be parsed as a COSE_Sign1 structure
    #[error("malformed proof: {0}")]
    Malformed(String),

    /// Proof names a prover key that is not registered
    #[error("unknown prover key: {0}")]
    UnknownProver(String),

    /// Proof does not carry a key identifier
    #[error("proof has no key identifier")]
    MissingKeyId,

    /// Signed payload differs from the submitted public outputs
    #[error("proof payload does not match submitted public outputs")]
    PayloadMismatch,

    /// Signature check failed
    #[error("invalid proof signature: {0}")]
    InvalidSignature(String),

    /// Key material could not be used
    #[error("cryptographic error: {0}")]
    Crypto(String),
}

/// Error parsing a hex-encoded content hash or address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexDigestError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

impl From<ed25519_dalek::SignatureError> for ProofError {
    fn from(err: ed25519_dalek::SignatureError) -> Self {
        ProofError::InvalidSignature(err.to_string())
    }
}

impl From<coset::CoseError> for ProofError {
    fn from(err: coset::CoseError) -> Self {
        ProofError::Malformed(format!("{:?}", err))
    }
}

impl From<hex::FromHexError> for HexDigestError {
    fn from(err: hex::FromHexError) -> Self {
        HexDigestError::InvalidHex(err.to_string())
    }
}
