//! Proof ledger
//!
//! Records, per (subject, project) pair, whether an eligibility proof
//! token was ever minted. `issued` only moves false to true; re-issuing
//! replaces the token handle but never clears the flag.

use crate::types::{Principal, ProjectId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use veil_fhe::Handle;

/// One subject's proof state for one project
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ProofRecord {
    /// Whether a token was ever minted for this pair
    pub issued: bool,
    /// Handle of the latest token ciphertext
    pub token: Handle,
}

/// Keyed ledger of issued proofs
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProofLedger {
    records: HashMap<(Principal, ProjectId), ProofRecord>,
}

impl ProofLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a minted token; idempotent on the `issued` flag
    pub fn mark_issued(&mut self, subject: Principal, project: ProjectId, token: Handle) {
        self.records.insert(
            (subject, project),
            ProofRecord {
                issued: true,
                token,
            },
        );
    }

    /// Whether a proof was ever issued for the pair
    pub fn has_proof(&self, subject: Principal, project: ProjectId) -> bool {
        self.records
            .get(&(subject, project))
            .map(|r| r.issued)
            .unwrap_or(false)
    }

    /// Look up the latest proof record for the pair
    pub fn get(&self, subject: Principal, project: ProjectId) -> Option<&ProofRecord> {
        self.records.get(&(subject, project))
    }
}

/// Derive the plaintext token value minted for an eligible subject
///
/// Opaque to everyone without a decrypt grant; nonzero by construction
/// so a decrypted zero always means "not eligible".
pub(crate) fn token_value(subject: Principal, project: ProjectId, now: u64) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"veil.proof.token.v1");
    hasher.update(subject.as_bytes());
    hasher.update(project.as_bytes());
    hasher.update(&now.to_le_bytes());
    let digest = hasher.finalize();
    u64::from_le_bytes(digest.as_bytes()[..8].try_into().unwrap()).max(1)
}
