//! Engine error taxonomy
//!
//! Every failure is local, atomic, and terminal for the call: none of
//! these clear without an external state change (resubmit, re-attest,
//! re-policy, re-authorize), so there is no retry machinery.

use crate::policy::MAX_ALLOWED_COUNTRIES;
use crate::types::{Principal, ProjectId};
use thiserror::Error;
use veil_fhe::FheError;

/// Errors surfaced by engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Submission proof did not validate (delegated to the substrate)
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    /// Subject never submitted an identity record
    #[error("No identity record for subject {0}")]
    NoSuchRecord(Principal),

    /// Caller is not an authorized verifier
    #[error("Principal {0} is not an authorized verifier")]
    UnauthorizedVerifier(Principal),

    /// Caller is not the administrator
    #[error("Principal {0} is not the administrator")]
    OnlyAdmin(Principal),

    /// Project has no active policy
    #[error("Project {0} has no active policy")]
    PolicyInactive(ProjectId),

    /// Subject's record was never attested (or attestation was reset)
    #[error("Subject {0} is not verified")]
    UserNotVerified(Principal),

    /// Allowed-country list exceeds the bound on the OR-fold
    #[error("Allowed-country list has {len} entries, maximum is {max}")]
    PolicyTooLarge { len: usize, max: usize },

    /// Substrate failure outside the submission path
    #[error("Ciphertext substrate error: {0}")]
    Fhe(#[from] FheError),
}

impl EngineError {
    pub(crate) fn policy_too_large(len: usize) -> Self {
        EngineError::PolicyTooLarge {
            len,
            max: MAX_ALLOWED_COUNTRIES,
        }
    }
}
