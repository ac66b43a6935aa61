//! VEIL Engine: encrypted credential eligibility
//!
//! Subjects register identity attributes that stay encrypted
//! end-to-end, accredited verifiers attest that the attributes were
//! checked, and third-party projects learn only an encrypted yes/no
//! eligibility answer. The engine never decrypts anything; it composes
//! homomorphic operators through the ciphertext vault and keeps the
//! permission bookkeeping that decides who may ever decrypt which
//! value.
//!
//! # Components
//! - [`IdentityStore`]: encrypted attribute bundle + attestation
//!   metadata per subject
//! - [`AuthorityTable`]: administrator + enabled-verifier set
//! - [`PolicyRegistry`]: per-project plaintext eligibility rules
//! - [`EligibilityEngine::evaluate`]: the homomorphic predicate
//! - [`ProofLedger`]: one-time proof token bookkeeping
//!
//! Every mutating call is atomic: preconditions and fallible substrate
//! work run before the first engine-state write.

pub mod authority;
pub mod engine;
pub mod errors;
pub mod events;
pub mod identity;
pub mod policy;
pub mod proof;
pub mod types;

mod eligibility;

pub use authority::AuthorityTable;
pub use engine::{current_year, unix_now, EligibilityEngine, SharedEngine};
pub use errors::EngineError;
pub use events::{EngineEvent, EventLog};
pub use identity::{AttestationStatus, IdentityRecord, IdentityStore};
pub use policy::{PolicyRegistry, PolicySpec, ProjectPolicy, MAX_ALLOWED_COUNTRIES};
pub use proof::{ProofLedger, ProofRecord};
pub use types::{Principal, ProjectId};
