//! Prover key management

mod registry;

pub use registry::ProverKeyRegistry;
