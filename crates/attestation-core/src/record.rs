//! The attestation record and its field vocabulary

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::HexDigestError;

/// Size of a content hash in bytes
pub const CONTENT_HASH_LEN: usize = 32;

/// Maximum length in bytes of each bounded string field (inclusive)
pub const MAX_STRING_LEN: usize = 128;

/// Number of bounded string fields in a record
pub const STRING_FIELD_COUNT: usize = 8;

/// 32-byte digest identifying a piece of content
///
/// This is the primary key of the store. Serialized as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ContentHash([u8; CONTENT_HASH_LEN]);

impl ContentHash {
    pub const fn new(bytes: [u8; CONTENT_HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// SHA-256 of `data`, for callers acting as their own hasher
    pub fn sha256(data: impl AsRef<[u8]>) -> Self {
        Self(Sha256::digest(data.as_ref()).into())
    }

    pub fn as_bytes(&self) -> &[u8; CONTENT_HASH_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; CONTENT_HASH_LEN]> for ContentHash {
    fn from(bytes: [u8; CONTENT_HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}

impl FromStr for ContentHash {
    type Err = HexDigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_digest(s).map(Self)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = HexDigestError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.to_hex()
    }
}

/// Parse a 64-character hex string into 32 bytes
pub(crate) fn parse_digest(s: &str) -> Result<[u8; 32], HexDigestError> {
    let bytes = hex::decode(s.trim())?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| HexDigestError::InvalidLength(len))
}

/// The bounded string fields of a record, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    TrustListMatch,
    ValidationState,
    SourceType,
    Issuer,
    CommonName,
    SoftwareAgent,
    SigningTime,
    CertFingerprint,
}

impl RecordField {
    /// All string fields in the order they appear on the wire
    pub const ALL: [RecordField; STRING_FIELD_COUNT] = [
        RecordField::TrustListMatch,
        RecordField::ValidationState,
        RecordField::SourceType,
        RecordField::Issuer,
        RecordField::CommonName,
        RecordField::SoftwareAgent,
        RecordField::SigningTime,
        RecordField::CertFingerprint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::TrustListMatch => "trust_list_match",
            RecordField::ValidationState => "validation_state",
            RecordField::SourceType => "source_type",
            RecordField::Issuer => "issuer",
            RecordField::CommonName => "common_name",
            RecordField::SoftwareAgent => "software_agent",
            RecordField::SigningTime => "signing_time",
            RecordField::CertFingerprint => "cert_fingerprint",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provenance claim bound to one content hash
///
/// This is the caller-supplied part of an attestation: exactly what the
/// proving subsystem commits as public outputs. Store-assigned fields
/// (`submitted_by`, `timestamp`) live on [`crate::Attestation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationRecord {
    /// Digest of the attested content
    pub content_hash: ContentHash,
    /// Whether the content carried a verified provenance manifest
    pub has_provenance_marker: bool,
    /// "official", "curated", or "untrusted"
    pub trust_list_match: String,
    /// Outcome of manifest validation, e.g. "Verified" or "None"
    pub validation_state: String,
    /// Digital source type URI
    pub source_type: String,
    /// Signing certificate issuer organization
    pub issuer: String,
    /// Signing certificate common name
    pub common_name: String,
    /// Tool that generated the content
    pub software_agent: String,
    /// Signature timestamp as reported by the manifest
    pub signing_time: String,
    /// Hex SHA-256 fingerprint of the leaf signing certificate
    pub cert_fingerprint: String,
}

impl AttestationRecord {
    /// Record for content without a provenance manifest
    pub fn unsigned(content_hash: ContentHash) -> Self {
        Self {
            content_hash,
            has_provenance_marker: false,
            trust_list_match: String::new(),
            validation_state: "None".to_string(),
            source_type: String::new(),
            issuer: String::new(),
            common_name: String::new(),
            software_agent: String::new(),
            signing_time: String::new(),
            cert_fingerprint: String::new(),
        }
    }

    /// Value of a bounded string field
    pub fn field(&self, field: RecordField) -> &str {
        match field {
            RecordField::TrustListMatch => &self.trust_list_match,
            RecordField::ValidationState => &self.validation_state,
            RecordField::SourceType => &self.source_type,
            RecordField::Issuer => &self.issuer,
            RecordField::CommonName => &self.common_name,
            RecordField::SoftwareAgent => &self.software_agent,
            RecordField::SigningTime => &self.signing_time,
            RecordField::CertFingerprint => &self.cert_fingerprint,
        }
    }

    /// Bounded string fields in wire order
    pub fn string_fields(&self) -> impl Iterator<Item = (RecordField, &str)> + '_ {
        RecordField::ALL.iter().map(move |f| (*f, self.field(*f)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_hex_roundtrip() {
        let hash = ContentHash::sha256(b"sample");
        let parsed: ContentHash = hash.to_hex().parse().unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn test_content_hash_known_digest() {
        let hash = ContentHash::sha256(b"sample");
        assert_eq!(
            hash.to_hex(),
            "af2bdbe1aa9b6ec1e2ade1d694f41fc71a831d0268e9891562113d8a62add1bf"
        );
    }

    #[test]
    fn test_content_hash_rejects_wrong_length() {
        let err = "abcd".parse::<ContentHash>().unwrap_err();
        assert_eq!(err, HexDigestError::InvalidLength(2));

        assert!(matches!(
            "zz".repeat(32).parse::<ContentHash>(),
            Err(HexDigestError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_content_hash_serializes_as_hex() {
        let hash = ContentHash::new([0xab; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));

        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn test_unsigned_record() {
        let record = AttestationRecord::unsigned(ContentHash::new([1; 32]));
        assert!(!record.has_provenance_marker);
        assert_eq!(record.validation_state, "None");
        assert_eq!(record.issuer, "");
    }

    #[test]
    fn test_string_fields_follow_wire_order() {
        let mut record = AttestationRecord::unsigned(ContentHash::new([0; 32]));
        record.trust_list_match = "official".into();
        record.cert_fingerprint = "ff".into();

        let fields: Vec<_> = record.string_fields().collect();
        assert_eq!(fields.len(), STRING_FIELD_COUNT);
        assert_eq!(fields[0], (RecordField::TrustListMatch, "official"));
        assert_eq!(fields[7], (RecordField::CertFingerprint, "ff"));
    }
}
