//! Submitter identity, resource budgets and committed attestations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::address::AddressVersion;
use crate::record::AttestationRecord;

/// Identity of the principal that pays for a commit
///
/// Supplied by the external identity layer; this crate records it but never
/// authenticates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalIdentifier {
    /// Type of principal
    #[serde(rename = "type")]
    pub principal_type: PrincipalType,

    /// Principal value (e.g. a wallet public key or an OIDC subject)
    pub value: String,
}

/// Types of principal identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalType {
    /// Wallet public key
    Wallet,
    /// OpenID Connect / OAuth2 subject
    Oidc,
    /// Decentralized Identifier
    Did,
    /// API Key
    ApiKey,
    /// Custom identifier
    Custom,
}

impl PrincipalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalType::Wallet => "wallet",
            PrincipalType::Oidc => "oidc",
            PrincipalType::Did => "did",
            PrincipalType::ApiKey => "apikey",
            PrincipalType::Custom => "custom",
        }
    }
}

impl FromStr for PrincipalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wallet" => Ok(PrincipalType::Wallet),
            "oidc" => Ok(PrincipalType::Oidc),
            "did" => Ok(PrincipalType::Did),
            "apikey" => Ok(PrincipalType::ApiKey),
            "custom" => Ok(PrincipalType::Custom),
            other => Err(format!("unknown principal type: {}", other)),
        }
    }
}

impl PrincipalIdentifier {
    /// Create a new principal identifier
    pub fn new(principal_type: PrincipalType, value: impl Into<String>) -> Self {
        Self {
            principal_type,
            value: value.into(),
        }
    }

    /// Create a wallet principal
    pub fn wallet(value: impl Into<String>) -> Self {
        Self::new(PrincipalType::Wallet, value)
    }

    /// Create an OIDC principal
    pub fn oidc(value: impl Into<String>) -> Self {
        Self::new(PrincipalType::Oidc, value)
    }

    /// Create a DID principal
    pub fn did(value: impl Into<String>) -> Self {
        Self::new(PrincipalType::Did, value)
    }
}

/// Renders as `type:value`
impl fmt::Display for PrincipalIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.principal_type.as_str(), self.value)
    }
}

/// Parses `type:value`; the value may itself contain colons
impl FromStr for PrincipalIdentifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = s
            .split_once(':')
            .ok_or_else(|| format!("expected type:value, got '{}'", s))?;
        if value.is_empty() {
            return Err(format!("empty principal value in '{}'", s));
        }
        Ok(Self::new(kind.parse()?, value))
    }
}

/// Resource ceiling a submitter is willing to spend on one commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBudget {
    pub max_units: u64,
}

impl ResourceBudget {
    /// Default compute ceiling per commit
    pub const DEFAULT_UNITS: u64 = 400_000;

    pub fn new(max_units: u64) -> Self {
        Self { max_units }
    }

    /// The tighter of two budgets
    pub fn min(self, other: ResourceBudget) -> ResourceBudget {
        ResourceBudget::new(self.max_units.min(other.max_units))
    }
}

impl Default for ResourceBudget {
    fn default() -> Self {
        Self::new(Self::DEFAULT_UNITS)
    }
}

/// Cost model for one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionCost {
    pub units: u64,
}

impl SubmissionCost {
    /// Fixed cost of a commit, independent of input size
    pub const BASE_UNITS: u64 = 20_000;
    /// Cost of running proof verification in-line
    pub const VERIFY_UNITS: u64 = 100_000;

    /// Estimate from input sizes; one unit per input byte
    pub fn estimate(proof_len: usize, outputs_len: usize, verifies: bool) -> Self {
        let bytes = (proof_len as u64).saturating_add(outputs_len as u64);
        let verify = if verifies { Self::VERIFY_UNITS } else { 0 };
        Self {
            units: Self::BASE_UNITS.saturating_add(bytes).saturating_add(verify),
        }
    }

    pub fn fits(&self, budget: &ResourceBudget) -> bool {
        self.units <= budget.max_units
    }
}

/// Caller context for a submission, supplied by the identity layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionContext {
    pub submitter: PrincipalIdentifier,
    pub budget: ResourceBudget,
}

impl SubmissionContext {
    pub fn new(submitter: PrincipalIdentifier) -> Self {
        Self {
            submitter,
            budget: ResourceBudget::default(),
        }
    }

    pub fn with_budget(mut self, budget: ResourceBudget) -> Self {
        self.budget = budget;
        self
    }
}

/// A committed attestation: the record plus store-assigned fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub record: AttestationRecord,
    /// Principal that paid for the commit
    pub submitted_by: PrincipalIdentifier,
    /// Seconds since the Unix epoch, assigned at commit
    pub timestamp: i64,
    /// Address scheme the attestation was committed under
    pub address_version: AddressVersion,
}
