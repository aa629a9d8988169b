//! Canonical binary encoding of attestation records
//!
//! The layout is fixed by the proving subsystem that commits public outputs,
//! so it must stay byte-exact:
//!
//! ```text
//! content_hash             32 bytes
//! has_provenance_marker     1 byte, 0 or 1
//! 8 x string                u64 little-endian length, then UTF-8 bytes
//! ```
//!
//! Strings appear in [`RecordField::ALL`] order. There is no padding and no
//! trailing data. Length limits are not checked here; see
//! [`crate::validation`].

use crate::error::CodecError;
use crate::record::{
    AttestationRecord, ContentHash, RecordField, CONTENT_HASH_LEN, MAX_STRING_LEN,
    STRING_FIELD_COUNT,
};

/// Width of each string length prefix
pub const LENGTH_PREFIX_LEN: usize = 8;

/// Size of the largest valid encoding: every string at [`MAX_STRING_LEN`]
///
/// Informational only. `decode` accepts longer input so that oversized
/// fields reach validation and are reported as such; the submission budget
/// bounds input size.
pub const MAX_ENCODED_LEN: usize =
    CONTENT_HASH_LEN + 1 + STRING_FIELD_COUNT * (LENGTH_PREFIX_LEN + MAX_STRING_LEN);

/// Exact size of `encode(record)`
pub fn encoded_len(record: &AttestationRecord) -> usize {
    CONTENT_HASH_LEN
        + 1
        + record
            .string_fields()
            .map(|(_, value)| LENGTH_PREFIX_LEN + value.len())
            .sum::<usize>()
}

/// Serialize a record to its canonical bytes
pub fn encode(record: &AttestationRecord) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(record));
    out.extend_from_slice(record.content_hash.as_bytes());
    out.push(u8::from(record.has_provenance_marker));
    for (_, value) in record.string_fields() {
        out.extend_from_slice(&(value.len() as u64).to_le_bytes());
        out.extend_from_slice(value.as_bytes());
    }
    out
}

/// Parse canonical bytes back into a record
///
/// Fails on truncation, a non-boolean marker byte, invalid UTF-8, or
/// unconsumed trailing bytes.
pub fn decode(bytes: &[u8]) -> Result<AttestationRecord, CodecError> {
    let mut reader = Reader::new(bytes);

    let mut hash = [0u8; CONTENT_HASH_LEN];
    hash.copy_from_slice(reader.take("content_hash", CONTENT_HASH_LEN as u64)?);

    let has_provenance_marker = match reader.take("has_provenance_marker", 1)?[0] {
        0 => false,
        1 => true,
        other => return Err(CodecError::InvalidBool(other)),
    };

    let trust_list_match = reader.string(RecordField::TrustListMatch)?;
    let validation_state = reader.string(RecordField::ValidationState)?;
    let source_type = reader.string(RecordField::SourceType)?;
    let issuer = reader.string(RecordField::Issuer)?;
    let common_name = reader.string(RecordField::CommonName)?;
    let software_agent = reader.string(RecordField::SoftwareAgent)?;
    let signing_time = reader.string(RecordField::SigningTime)?;
    let cert_fingerprint = reader.string(RecordField::CertFingerprint)?;

    reader.finish()?;

    Ok(AttestationRecord {
        content_hash: ContentHash::new(hash),
        has_provenance_marker,
        trust_list_match,
        validation_state,
        source_type,
        issuer,
        common_name,
        software_agent,
        signing_time,
        cert_fingerprint,
    })
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, field: &'static str, len: u64) -> Result<&'a [u8], CodecError> {
        let remaining = self.remaining();
        if len > remaining as u64 {
            return Err(CodecError::Truncated {
                field,
                needed: len,
                remaining,
            });
        }
        // len <= remaining, so it fits in usize
        let len = len as usize;
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn string(&mut self, field: RecordField) -> Result<String, CodecError> {
        let prefix = self.take(field.as_str(), LENGTH_PREFIX_LEN as u64)?;
        let mut len = [0u8; LENGTH_PREFIX_LEN];
        len.copy_from_slice(prefix);
        let bytes = self.take(field.as_str(), u64::from_le_bytes(len))?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8 { field })
    }

    fn finish(self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            count => Err(CodecError::TrailingBytes { count }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> AttestationRecord {
        AttestationRecord {
            content_hash: ContentHash::sha256(b"sample"),
            has_provenance_marker: true,
            trust_list_match: "official".into(),
            validation_state: "Verified".into(),
            source_type: "http://cv.iptc.org/newscodes/digitalsourcetype/trainedAlgorithmicMedia"
                .into(),
            issuer: "Example Imaging Inc".into(),
            common_name: "Example Signer".into(),
            software_agent: "Example Editor 2.1".into(),
            signing_time: "2025-01-01T00:00:00Z".into(),
            cert_fingerprint: "9f".repeat(32),
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let record = sample_record();
        let bytes = encode(&record);
        assert_eq!(bytes.len(), encoded_len(&record));
        assert_eq!(decode(&bytes).unwrap(), record);
    }

    #[test]
    fn test_layout_prefix() {
        let record = sample_record();
        let bytes = encode(&record);

        assert_eq!(&bytes[..32], record.content_hash.as_bytes());
        assert_eq!(bytes[32], 1);
        assert_eq!(&bytes[33..41], &8u64.to_le_bytes());
        assert_eq!(&bytes[41..49], b"official");
    }

    #[test]
    fn test_unsigned_record_size() {
        let record = AttestationRecord::unsigned(ContentHash::new([0; 32]));
        // hash + bool + 8 prefixes + "None"
        assert_eq!(encode(&record).len(), 32 + 1 + 8 * 8 + 4);
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let mut bytes = encode(&sample_record());
        bytes.push(0);
        assert_eq!(decode(&bytes), Err(CodecError::TrailingBytes { count: 1 }));
    }

    #[test]
    fn test_decode_rejects_truncation() {
        let bytes = encode(&sample_record());
        for cut in [0, 31, 32, 40, bytes.len() - 1] {
            assert!(
                matches!(decode(&bytes[..cut]), Err(CodecError::Truncated { .. })),
                "cut at {} should be truncated",
                cut
            );
        }
    }

    #[test]
    fn test_decode_rejects_oversized_length_prefix() {
        let mut bytes = encode(&AttestationRecord::unsigned(ContentHash::new([0; 32])));
        bytes[33..41].copy_from_slice(&u64::MAX.to_le_bytes());

        let err = decode(&bytes).unwrap_err();
        assert_eq!(
            err,
            CodecError::Truncated {
                field: "trust_list_match",
                needed: u64::MAX,
                remaining: bytes.len() - 41,
            }
        );
    }

    #[test]
    fn test_decode_rejects_non_boolean_marker() {
        let mut bytes = encode(&sample_record());
        bytes[32] = 2;
        assert_eq!(decode(&bytes), Err(CodecError::InvalidBool(2)));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let mut record = AttestationRecord::unsigned(ContentHash::new([0; 32]));
        record.issuer = "ab".into();
        let mut bytes = encode(&record);
        let pos = bytes.windows(2).position(|w| w == b"ab").unwrap();
        bytes[pos] = 0xff;

        assert_eq!(
            decode(&bytes),
            Err(CodecError::InvalidUtf8 {
                field: RecordField::Issuer
            })
        );
    }

    #[test]
    fn test_encode_ignores_length_policy() {
        let long = "x".repeat(MAX_STRING_LEN + 1);
        let record = AttestationRecord {
            trust_list_match: long.clone(),
            validation_state: long.clone(),
            source_type: long.clone(),
            issuer: long.clone(),
            common_name: long.clone(),
            software_agent: long.clone(),
            signing_time: long.clone(),
            cert_fingerprint: long,
            ..sample_record()
        };

        let bytes = encode(&record);
        assert_eq!(bytes.len(), MAX_ENCODED_LEN + STRING_FIELD_COUNT);
        assert_eq!(decode(&bytes).unwrap(), record);
    }

    #[test]
    fn test_max_encoded_len_is_largest_valid_record() {
        let full = "y".repeat(MAX_STRING_LEN);
        let record = AttestationRecord {
            trust_list_match: full.clone(),
            validation_state: full.clone(),
            source_type: full.clone(),
            issuer: full.clone(),
            common_name: full.clone(),
            software_agent: full.clone(),
            signing_time: full.clone(),
            cert_fingerprint: full,
            ..sample_record()
        };

        assert_eq!(encoded_len(&record), MAX_ENCODED_LEN);
        assert_eq!(encode(&record).len(), MAX_ENCODED_LEN);
    }
}
