//! Admission rules for decoded records
//!
//! These checks run before any storage mutation and never touch storage
//! themselves. Rules are evaluated in order and the first failure wins:
//!
//! 1. The record's content hash equals the hash the caller declared.
//! 2. Every bounded string field is at most [`MAX_STRING_LEN`] bytes.
//!
//! Proof validity is the job of a [`crate::ProofVerifier`].

use tracing::warn;

use crate::error::ValidationError;
use crate::record::{AttestationRecord, ContentHash, MAX_STRING_LEN};

/// Validate a decoded record against the caller-declared content hash
pub fn validate_record(
    declared: &ContentHash,
    record: &AttestationRecord,
) -> Result<(), ValidationError> {
    validate_hash_binding(declared, record)?;
    validate_field_lengths(record)
}

/// Rule 1: the record must describe the declared content
pub fn validate_hash_binding(
    declared: &ContentHash,
    record: &AttestationRecord,
) -> Result<(), ValidationError> {
    if record.content_hash == *declared {
        return Ok(());
    }

    warn!(
        declared = %declared,
        decoded = %record.content_hash,
        "SECURITY: content hash does not match public outputs"
    );

    Err(ValidationError::ContentHashMismatch {
        declared: declared.to_hex(),
        decoded: record.content_hash.to_hex(),
    })
}

/// Rule 2: each string field is within the byte limit
pub fn validate_field_lengths(record: &AttestationRecord) -> Result<(), ValidationError> {
    for (field, value) in record.string_fields() {
        if value.len() > MAX_STRING_LEN {
            warn!(field = %field, len = value.len(), "String field exceeds limit");
            return Err(ValidationError::StringTooLong {
                field,
                len: value.len(),
                max: MAX_STRING_LEN,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordField;

    fn record_for(data: &[u8]) -> AttestationRecord {
        let mut record = AttestationRecord::unsigned(ContentHash::sha256(data));
        record.has_provenance_marker = true;
        record.trust_list_match = "curated".into();
        record.validation_state = "Verified".into();
        record
    }

    #[test]
    fn test_matching_hash_accepted() {
        let record = record_for(b"sample");
        assert!(validate_record(&ContentHash::sha256(b"sample"), &record).is_ok());
    }

    #[test]
    fn test_hash_mismatch_rejected() {
        let record = record_for(b"other");
        let declared = ContentHash::sha256(b"sample");

        let err = validate_record(&declared, &record).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ContentHashMismatch {
                declared: declared.to_hex(),
                decoded: record.content_hash.to_hex(),
            }
        );
    }

    #[test]
    fn test_length_boundary_is_inclusive() {
        let declared = ContentHash::sha256(b"sample");

        let mut record = record_for(b"sample");
        record.common_name = "a".repeat(MAX_STRING_LEN);
        assert!(validate_record(&declared, &record).is_ok());

        record.common_name = "a".repeat(MAX_STRING_LEN + 1);
        assert_eq!(
            validate_record(&declared, &record),
            Err(ValidationError::StringTooLong {
                field: RecordField::CommonName,
                len: MAX_STRING_LEN + 1,
                max: MAX_STRING_LEN,
            })
        );
    }

    #[test]
    fn test_length_counts_bytes_not_chars() {
        let declared = ContentHash::sha256(b"sample");
        let mut record = record_for(b"sample");
        // 65 two-byte chars = 130 bytes
        record.issuer = "é".repeat(65);

        assert!(matches!(
            validate_record(&declared, &record),
            Err(ValidationError::StringTooLong { field: RecordField::Issuer, len: 130, .. })
        ));
    }

    #[test]
    fn test_every_field_is_bounded() {
        let declared = ContentHash::sha256(b"sample");
        for field in RecordField::ALL {
            let mut record = record_for(b"sample");
            let long = "x".repeat(MAX_STRING_LEN + 1);
            match field {
                RecordField::TrustListMatch => record.trust_list_match = long,
                RecordField::ValidationState => record.validation_state = long,
                RecordField::SourceType => record.source_type = long,
                RecordField::Issuer => record.issuer = long,
                RecordField::CommonName => record.common_name = long,
                RecordField::SoftwareAgent => record.software_agent = long,
                RecordField::SigningTime => record.signing_time = long,
                RecordField::CertFingerprint => record.cert_fingerprint = long,
            }

            match validate_record(&declared, &record) {
                Err(ValidationError::StringTooLong { field: got, .. }) => assert_eq!(got, field),
                other => panic!("expected StringTooLong for {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_hash_mismatch_wins_over_length() {
        let mut record = record_for(b"other");
        record.issuer = "x".repeat(MAX_STRING_LEN + 1);

        assert!(matches!(
            validate_record(&ContentHash::sha256(b"sample"), &record),
            Err(ValidationError::ContentHashMismatch { .. })
        ));
    }

    #[test]
    fn test_first_oversized_field_is_reported() {
        let declared = ContentHash::sha256(b"sample");
        let mut record = record_for(b"sample");
        record.signing_time = "x".repeat(200);
        record.source_type = "x".repeat(200);

        assert!(matches!(
            validate_record(&declared, &record),
            Err(ValidationError::StringTooLong { field: RecordField::SourceType, .. })
        ));
    }
}
