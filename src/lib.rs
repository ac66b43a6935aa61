//! VEIL: Encrypted Credential Eligibility
//!
//! Root crate re-exporting the VEIL components for integration testing
//! and unified access.
//!
//! ## Architecture Overview
//!
//! Identity attributes are encrypted end-to-end with TFHE; the engine
//! evaluates per-project eligibility policies (minimum age, country
//! allow-list, passport-on-file) as homomorphic predicates over those
//! ciphertexts and mints encrypted proof tokens. Decryption rights are
//! tracked per ciphertext and granted only to the parties an operation
//! names.
//!
//! ## Crate Organization
//!
//! - `veil-fhe`: ciphertext substrate (TFHE-rs values, handle vault,
//!   decrypt-permission ACL, submission sealing)
//! - `veil-engine`: identity records, verifier authority, policy
//!   registry, eligibility evaluator, proof ledger

pub use veil_engine as engine;
pub use veil_fhe as fhe;

/// VEIL protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use veil_engine::{
        current_year, AttestationStatus, EligibilityEngine, EngineError, EngineEvent,
        PolicySpec, Principal, ProjectId, SharedEngine,
    };
    pub use veil_fhe::{
        CipherVault, ClientKey, FheConfig, FheError, Handle, InstanceKeys, SubmissionBundle,
    };
}
