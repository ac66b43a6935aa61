//! Identity record store
//!
//! One encrypted attribute bundle plus plaintext attestation metadata
//! per subject. The attributes live in the ciphertext vault; the store
//! holds only their handles, so no identity attribute ever rests here
//! in plaintext.

use crate::errors::EngineError;
use crate::types::Principal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use veil_fhe::{AttributeHandles, Handle};

/// A subject's registered identity
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Ciphertext of the passport-derived digest (never decrypted by the engine)
    pub passport: Handle,
    /// Ciphertext of the birth year
    pub birth_year: Handle,
    /// Ciphertext of the country code
    pub country: Handle,
    /// Whether an authorized verifier attested this record
    pub attested: bool,
    /// Attestation timestamp (unix seconds, 0 when unattested)
    pub attested_at: u64,
    /// Attesting verifier
    pub attested_by: Option<Principal>,
}

impl IdentityRecord {
    fn new(handles: AttributeHandles) -> Self {
        Self {
            passport: handles.passport,
            birth_year: handles.birth_year,
            country: handles.country,
            attested: false,
            attested_at: 0,
            attested_by: None,
        }
    }
}

/// Plaintext attestation metadata (not secret)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationStatus {
    pub attested: bool,
    pub attested_at: u64,
    pub attested_by: Option<Principal>,
}

/// Keyed store of identity records, one per subject
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IdentityStore {
    records: HashMap<Principal, IdentityRecord>,
}

impl IdentityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly submitted record, replacing any prior one
    ///
    /// The replacement starts unattested: resubmission is revocation of
    /// prior attestation, stale attestations must not survive attribute
    /// changes.
    pub fn insert(&mut self, subject: Principal, handles: AttributeHandles) {
        self.records.insert(subject, IdentityRecord::new(handles));
    }

    /// Mark a record attested
    ///
    /// Authority is the caller's concern; the store only enforces that
    /// the record exists.
    pub fn attest(
        &mut self,
        subject: Principal,
        verifier: Principal,
        now: u64,
    ) -> Result<(), EngineError> {
        let record = self
            .records
            .get_mut(&subject)
            .ok_or(EngineError::NoSuchRecord(subject))?;
        record.attested = true;
        record.attested_at = now;
        record.attested_by = Some(verifier);
        Ok(())
    }

    /// Look up a record
    pub fn get(&self, subject: Principal) -> Option<&IdentityRecord> {
        self.records.get(&subject)
    }

    /// Attestation metadata for a subject
    pub fn status_of(&self, subject: Principal) -> Result<AttestationStatus, EngineError> {
        let record = self
            .records
            .get(&subject)
            .ok_or(EngineError::NoSuchRecord(subject))?;
        Ok(AttestationStatus {
            attested: record.attested,
            attested_at: record.attested_at,
            attested_by: record.attested_by,
        })
    }

    /// Number of registered subjects
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
