//! Caller-facing error taxonomy

use attestation_core::{AttestationAddress, CodecError, ProofError, RecordField, ValidationError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::storage::StorageError;

/// Outcome of a failed submission or query
///
/// Every rejection before `AlreadyExists` happens before the store is
/// touched, so there is never a partial write to recover from.
#[derive(Error, Debug)]
pub enum AttestationError {
    #[error("Malformed record: {0}")]
    MalformedRecord(CodecError),

    #[error("Content hash mismatch: declared {declared}, record carries {decoded}")]
    ContentHashMismatch { declared: String, decoded: String },

    #[error("Field {field} is {len} bytes, maximum is {max}")]
    StringTooLong {
        field: RecordField,
        len: usize,
        max: usize,
    },

    #[error("Proof verification failed: {0}")]
    ProofVerificationFailed(ProofError),

    #[error("Content already attested at {address}")]
    AlreadyExists { address: AttestationAddress },

    #[error("No attestation for {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Resource budget exhausted: requires {required} units, {available} available")]
    ResourceExhausted { required: u64, available: u64 },

    #[error("Storage error: {0}")]
    Storage(StorageError),

    #[error("Configuration error: {0}")]
    Config(ConfigError),
}

impl AttestationError {
    /// Stable tag for outer layers
    pub fn code(&self) -> &'static str {
        match self {
            AttestationError::MalformedRecord(_) => "MALFORMED_RECORD",
            AttestationError::ContentHashMismatch { .. } => "CONTENT_HASH_MISMATCH",
            AttestationError::StringTooLong { .. } => "STRING_TOO_LONG",
            AttestationError::ProofVerificationFailed(_) => "PROOF_VERIFICATION_FAILED",
            AttestationError::AlreadyExists { .. } => "ALREADY_EXISTS",
            AttestationError::NotFound(_) => "NOT_FOUND",
            AttestationError::Unauthorized(_) => "UNAUTHORIZED",
            AttestationError::ResourceExhausted { .. } => "RESOURCE_EXHAUSTED",
            AttestationError::Storage(_) => "STORAGE_ERROR",
            AttestationError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// The content is already attested; callers treat this as success
    pub fn is_already_attested(&self) -> bool {
        matches!(self, AttestationError::AlreadyExists { .. })
    }

    /// Fault lies with the submitted data; resubmitting unchanged cannot succeed
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            AttestationError::MalformedRecord(_)
                | AttestationError::ContentHashMismatch { .. }
                | AttestationError::StringTooLong { .. }
                | AttestationError::ProofVerificationFailed(_)
        )
    }
}

impl From<CodecError> for AttestationError {
    fn from(err: CodecError) -> Self {
        AttestationError::MalformedRecord(err)
    }
}

impl From<ValidationError> for AttestationError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::ContentHashMismatch { declared, decoded } => {
                AttestationError::ContentHashMismatch { declared, decoded }
            }
            ValidationError::StringTooLong { field, len, max } => {
                AttestationError::StringTooLong { field, len, max }
            }
        }
    }
}

impl From<ProofError> for AttestationError {
    fn from(err: ProofError) -> Self {
        AttestationError::ProofVerificationFailed(err)
    }
}

impl From<StorageError> for AttestationError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AlreadyExists(address) => AttestationError::AlreadyExists { address },
            other => AttestationError::Storage(other),
        }
    }
}

impl From<ConfigError> for AttestationError {
    fn from(err: ConfigError) -> Self {
        AttestationError::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attestation_core::{derive_address, ContentHash};

    #[test]
    fn test_storage_conflict_maps_to_already_exists() {
        let address = derive_address("attestation", &ContentHash::sha256(b"x"));
        let err: AttestationError = StorageError::AlreadyExists(address).into();

        assert!(err.is_already_attested());
        assert!(!err.is_caller_error());
        assert_eq!(err.code(), "ALREADY_EXISTS");
    }

    #[test]
    fn test_validation_errors_keep_field_tag() {
        let err: AttestationError = ValidationError::StringTooLong {
            field: RecordField::SigningTime,
            len: 129,
            max: 128,
        }
        .into();

        assert_eq!(err.code(), "STRING_TOO_LONG");
        assert!(err.is_caller_error());
        assert_eq!(err.to_string(), "Field signing_time is 129 bytes, maximum is 128");
    }

    #[test]
    fn test_other_storage_errors_stay_storage() {
        let err: AttestationError = StorageError::Database("down".into()).into();
        assert_eq!(err.code(), "STORAGE_ERROR");
        assert!(!err.is_already_attested());
    }
}
