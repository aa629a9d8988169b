//! Deterministic storage addresses for attestations
//!
//! An address is a pure function of `(namespace, content_hash)` so writers and
//! readers find the same slot without scanning. The derivation is versioned:
//! changing it would orphan every committed attestation, so a new scheme gets a
//! new [`AddressVersion`] instead of replacing V1.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;

use crate::error::HexDigestError;
use crate::record::{parse_digest, ContentHash};

type HmacSha256 = Hmac<Sha256>;

/// Namespace used when the deployment does not configure one
pub const DEFAULT_NAMESPACE: &str = "attestation";

/// Address derivation scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressVersion {
    /// HMAC-SHA256 keyed by the domain tag, over the length-prefixed
    /// namespace followed by the content hash
    V1,
}

impl AddressVersion {
    /// Scheme used for new commits
    pub const CURRENT: AddressVersion = AddressVersion::V1;

    fn domain_tag(&self) -> &'static [u8] {
        match self {
            AddressVersion::V1 => b"attestation-address/v1",
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            AddressVersion::V1 => 1,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(AddressVersion::V1),
            _ => None,
        }
    }

    /// Derive the address of `content_hash` within `namespace`
    pub fn derive(&self, namespace: &str, content_hash: &ContentHash) -> AttestationAddress {
        let mut mac =
            HmacSha256::new_from_slice(self.domain_tag()).expect("HMAC can take key of any size");
        mac.update(&(namespace.len() as u64).to_le_bytes());
        mac.update(namespace.as_bytes());
        mac.update(content_hash.as_bytes());
        AttestationAddress(mac.finalize().into_bytes().into())
    }
}

/// Derive an address with the current scheme
pub fn derive_address(namespace: &str, content_hash: &ContentHash) -> AttestationAddress {
    AddressVersion::CURRENT.derive(namespace, content_hash)
}

/// Storage slot of one attestation
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct AttestationAddress([u8; 32]);

impl AttestationAddress {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for AttestationAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for AttestationAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttestationAddress({})", self.to_hex())
    }
}

impl FromStr for AttestationAddress {
    type Err = HexDigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_digest(s).map(Self)
    }
}

impl TryFrom<String> for AttestationAddress {
    type Error = HexDigestError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AttestationAddress> for String {
    fn from(address: AttestationAddress) -> Self {
        address.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic() {
        let hash = ContentHash::sha256(b"sample");
        assert_eq!(
            derive_address(DEFAULT_NAMESPACE, &hash),
            derive_address(DEFAULT_NAMESPACE, &hash)
        );
    }

    #[test]
    fn test_distinct_hashes_get_distinct_addresses() {
        let a = derive_address(DEFAULT_NAMESPACE, &ContentHash::sha256(b"a"));
        let b = derive_address(DEFAULT_NAMESPACE, &ContentHash::sha256(b"b"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_namespace_separates_addresses() {
        let hash = ContentHash::sha256(b"sample");
        assert_ne!(derive_address("attestation", &hash), derive_address("staging", &hash));
    }

    #[test]
    fn test_namespace_is_length_prefixed() {
        // "ab" + hash starting with 'c' must not collide with "abc" + shifted hash
        let mut left = [0u8; 32];
        left[0] = b'c';
        let mut right = [0u8; 32];
        right[..31].copy_from_slice(&left[1..]);

        let a = derive_address("ab", &ContentHash::new(left));
        let b = derive_address("abc", &ContentHash::new(right));
        assert_ne!(a, b);
    }

    #[test]
    fn test_matches_manual_hmac() {
        let hash = ContentHash::new([7; 32]);
        let mut mac = HmacSha256::new_from_slice(b"attestation-address/v1").unwrap();
        mac.update(&11u64.to_le_bytes());
        mac.update(b"attestation");
        mac.update(&[7; 32]);
        let expected: [u8; 32] = mac.finalize().into_bytes().into();

        assert_eq!(derive_address(DEFAULT_NAMESPACE, &hash).as_bytes(), &expected);
    }

    #[test]
    fn test_version_tag_roundtrip() {
        assert_eq!(AddressVersion::from_u8(AddressVersion::V1.as_u8()), Some(AddressVersion::V1));
        assert_eq!(AddressVersion::from_u8(0), None);
    }

    #[test]
    fn test_address_hex_roundtrip() {
        let address = derive_address(DEFAULT_NAMESPACE, &ContentHash::sha256(b"x"));
        let parsed: AttestationAddress = address.to_string().parse().unwrap();
        assert_eq!(parsed, address);
    }
}
