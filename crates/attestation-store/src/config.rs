//! Service configuration
//!
//! Read from `ATTESTATION_*` environment variables at process start.

use attestation_core::{
    PrincipalIdentifier, ResourceBudget, SerializablePublicKey, DEFAULT_NAMESPACE,
};
use std::collections::HashSet;
use std::env;
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;

/// Configuration error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error("prover key '{kid}' in ATTESTATION_PROVER_KEYS is unusable: {reason}")]
    InvalidProverKey { kid: String, reason: String },

    #[error("ATTESTATION_DATABASE_URL is set but the postgres feature is not enabled")]
    PostgresUnavailable,
}

/// How proofs are checked during `submit`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerificationMode {
    /// Verify every proof against the prover key registry before committing
    #[default]
    Required,
    /// Proofs were verified upstream; accept them as given
    PreVerified,
}

impl FromStr for VerificationMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "required" => Ok(VerificationMode::Required),
            "pre-verified" | "preverified" => Ok(VerificationMode::PreVerified),
            _ => Err(()),
        }
    }
}

/// Attestation service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Namespace tag for address derivation
    pub namespace: String,
    pub verification: VerificationMode,
    /// Prover keys trusted when verification is required
    pub prover_keys: Vec<SerializablePublicKey>,
    /// Per-submission resource ceiling
    pub budget: ResourceBudget,
    /// When set, only these principals may submit
    pub authorized_submitters: Option<HashSet<PrincipalIdentifier>>,
    /// PostgreSQL URL; in-memory storage when unset
    pub database_url: Option<String>,
    pub log_level: Level,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            verification: VerificationMode::Required,
            prover_keys: Vec::new(),
            budget: ResourceBudget::default(),
            authorized_submitters: None,
            database_url: None,
            log_level: Level::INFO,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(namespace) = lookup("ATTESTATION_NAMESPACE") {
            if namespace.is_empty() {
                return Err(invalid("ATTESTATION_NAMESPACE", namespace));
            }
            config.namespace = namespace;
        }

        if let Some(mode) = lookup("ATTESTATION_VERIFICATION") {
            config.verification = mode
                .parse()
                .map_err(|_| invalid("ATTESTATION_VERIFICATION", mode))?;
        }

        if let Some(keys) = lookup("ATTESTATION_PROVER_KEYS") {
            config.prover_keys = parse_prover_keys(&keys)?;
        }

        if let Some(units) = lookup("ATTESTATION_BUDGET_UNITS") {
            let max_units = units
                .trim()
                .parse()
                .map_err(|_| invalid("ATTESTATION_BUDGET_UNITS", units.clone()))?;
            config.budget = ResourceBudget::new(max_units);
        }

        if let Some(list) = lookup("ATTESTATION_AUTHORIZED_SUBMITTERS") {
            let submitters = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<PrincipalIdentifier>()
                        .map_err(|_| invalid("ATTESTATION_AUTHORIZED_SUBMITTERS", s))
                })
                .collect::<Result<HashSet<PrincipalIdentifier>, _>>()?;
            config.authorized_submitters = Some(submitters);
        }

        config.database_url = lookup("ATTESTATION_DATABASE_URL").filter(|url| !url.is_empty());

        if let Some(level) = lookup("ATTESTATION_LOG_LEVEL") {
            config.log_level = level
                .parse()
                .map_err(|_| invalid("ATTESTATION_LOG_LEVEL", level.clone()))?;
        }

        Ok(config)
    }
}

fn invalid(key: &'static str, value: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.into(),
    }
}

/// Parse `kid=base64key,kid=base64key`
fn parse_prover_keys(raw: &str) -> Result<Vec<SerializablePublicKey>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> Result<SerializablePublicKey, ConfigError> {
            let (kid, key) = entry
                .split_once('=')
                .filter(|(kid, key)| !kid.is_empty() && !key.is_empty())
                .ok_or_else(|| invalid("ATTESTATION_PROVER_KEYS", entry))?;
            Ok(SerializablePublicKey {
                kid: kid.to_string(),
                key: key.to_string(),
            })
        })
        .collect()
}
