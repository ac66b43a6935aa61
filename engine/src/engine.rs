//! The eligibility engine
//!
//! Owns the identity record store, verifier authority, policy registry,
//! evaluator result cache, proof ledger, and event log for one engine
//! instance. The ciphertext vault is an external capability passed into
//! every call that touches encrypted values.
//!
//! Execution model: every mutating operation takes `&mut self`, so
//! calls against one instance are serialized and atomic by
//! construction. Each operation validates its preconditions and runs
//! all fallible substrate work before its first engine-state write;
//! grants and cache updates commit last. Hosts that share an instance
//! across threads wrap it in [`SharedEngine`].

use crate::authority::AuthorityTable;
use crate::eligibility;
use crate::errors::EngineError;
use crate::events::{EngineEvent, EventLog};
use crate::identity::{AttestationStatus, IdentityRecord, IdentityStore};
use crate::policy::{PolicyRegistry, PolicySpec, ProjectPolicy};
use crate::proof::{self, ProofLedger, ProofRecord};
use crate::types::{Principal, ProjectId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use veil_fhe::{CipherVault, FheError, Handle, SubmissionBundle};

/// Current unix time in seconds
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Current calendar year derived from the unix clock
///
/// Uses the mean Gregorian year length; exposed so harnesses can build
/// birth years relative to the engine's own notion of "now".
pub fn current_year() -> u32 {
    const MEAN_YEAR_SECS: u64 = 31_556_952;
    1970 + (unix_now() / MEAN_YEAR_SECS) as u32
}

/// One instance of the encrypted credential eligibility engine
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EligibilityEngine {
    instance_id: [u8; 32],
    authority: AuthorityTable,
    identities: IdentityStore,
    policies: PolicyRegistry,
    results: HashMap<(ProjectId, Principal), Handle>,
    proofs: ProofLedger,
    events: EventLog,
}

/// Thread-shared engine handle for hosts without a serializing ledger
pub type SharedEngine = Arc<RwLock<EligibilityEngine>>;

impl EligibilityEngine {
    /// Create a fresh instance with the given administrator
    pub fn new(administrator: Principal) -> Self {
        let mut nonce = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut nonce);

        let mut hasher = blake3::Hasher::new();
        hasher.update(b"veil.instance.v1");
        hasher.update(administrator.as_bytes());
        hasher.update(&nonce);

        Self {
            instance_id: *hasher.finalize().as_bytes(),
            authority: AuthorityTable::new(administrator),
            identities: IdentityStore::new(),
            policies: PolicyRegistry::new(),
            results: HashMap::new(),
            proofs: ProofLedger::new(),
            events: EventLog::new(),
        }
    }

    /// Identifier submission proofs must bind to
    pub fn instance_id(&self) -> [u8; 32] {
        self.instance_id
    }

    /// The engine's own grant principal
    pub fn engine_principal(&self) -> Principal {
        Principal::from_bytes(self.instance_id)
    }

    /// The verifier authority table
    pub fn authority(&self) -> &AuthorityTable {
        &self.authority
    }

    // ---- identity record store ----

    /// Register (or replace) the caller's identity record
    ///
    /// The substrate verifies the bundle's binding proof before any
    /// ciphertext is admitted. A replacement clears attestation; the
    /// engine principal and the subject receive decrypt grants on the
    /// three attribute ciphertexts, nobody else.
    pub fn submit(
        &mut self,
        vault: &mut CipherVault,
        caller: Principal,
        bundle: &SubmissionBundle,
    ) -> Result<(), EngineError> {
        let handles = vault
            .ingest_submission(bundle, caller.into_bytes())
            .map_err(|e| match e {
                FheError::InvalidProof(msg) => EngineError::InvalidSubmission(msg),
                other => EngineError::Fhe(other),
            })?;

        let engine = self.engine_principal();
        for handle in [handles.passport, handles.birth_year, handles.country] {
            vault.allow(handle, engine.into_bytes())?;
            vault.allow(handle, caller.into_bytes())?;
        }

        self.identities.insert(caller, handles);
        self.events.record(EngineEvent::Submitted {
            subject: caller,
            at: unix_now(),
        });
        Ok(())
    }

    /// Attest the subject's current record
    ///
    /// Caller must be the administrator or an enabled verifier.
    pub fn attest(&mut self, caller: Principal, subject: Principal) -> Result<(), EngineError> {
        if !self.authority.is_authorized(caller) {
            return Err(EngineError::UnauthorizedVerifier(caller));
        }
        let now = unix_now();
        self.identities.attest(subject, caller, now)?;
        self.events.record(EngineEvent::Attested {
            subject,
            verifier: caller,
            at: now,
        });
        Ok(())
    }

    /// Attestation metadata for a subject (not secret, unrestricted read)
    pub fn status_of(&self, subject: Principal) -> Result<AttestationStatus, EngineError> {
        self.identities.status_of(subject)
    }

    /// A subject's record, if any (handles and attestation metadata only)
    pub fn record(&self, subject: Principal) -> Option<&IdentityRecord> {
        self.identities.get(subject)
    }

    // ---- verifier authority ----

    /// Enable or disable a verifier (administrator only)
    ///
    /// Idempotent state-wise; an event is emitted either way.
    pub fn set_verifier(
        &mut self,
        caller: Principal,
        principal: Principal,
        enabled: bool,
    ) -> Result<(), EngineError> {
        let changed = self.authority.set_verifier(caller, principal, enabled)?;
        self.events.record(EngineEvent::VerifierChanged {
            principal,
            enabled,
            changed,
            at: unix_now(),
        });
        Ok(())
    }

    /// True iff `principal` may attest and manage policies
    pub fn is_authorized(&self, principal: Principal) -> bool {
        self.authority.is_authorized(principal)
    }

    // ---- policy registry ----

    /// Register a project policy, replacing any prior one wholesale
    ///
    /// Caller must be an authorized verifier. The new policy is active.
    pub fn set_policy(
        &mut self,
        caller: Principal,
        project: ProjectId,
        spec: PolicySpec,
    ) -> Result<(), EngineError> {
        if !self.authority.is_authorized(caller) {
            return Err(EngineError::UnauthorizedVerifier(caller));
        }
        self.policies.set(project, spec)?;
        self.events.record(EngineEvent::PolicyChanged {
            project,
            by: caller,
            at: unix_now(),
        });
        Ok(())
    }

    /// Look up a project policy
    pub fn policy_of(&self, project: ProjectId) -> Option<&ProjectPolicy> {
        self.policies.get(project)
    }

    // ---- eligibility evaluator ----

    /// Evaluate the project's policy against the subject's record
    ///
    /// Returns a handle to an encrypted boolean; the engine never
    /// decrypts its own output. Decrypt grants go to exactly the caller
    /// and the subject. The result supersedes any previous one for the
    /// (project, subject) pair. A single-use policy is consumed by a
    /// successful evaluation.
    pub fn evaluate(
        &mut self,
        vault: &mut CipherVault,
        subject: Principal,
        project: ProjectId,
        caller: Principal,
    ) -> Result<Handle, EngineError> {
        let record = self
            .identities
            .get(subject)
            .ok_or(EngineError::NoSuchRecord(subject))?;
        if !record.attested {
            return Err(EngineError::UserNotVerified(subject));
        }
        let (birth_year, country, attested) = (record.birth_year, record.country, record.attested);

        let policy = match self.policies.get(project) {
            Some(p) if p.active => p.clone(),
            _ => return Err(EngineError::PolicyInactive(project)),
        };

        let eligible = eligibility::evaluate_predicate(
            vault,
            birth_year,
            country,
            attested,
            &policy,
            current_year(),
        )?;

        // Commit point: nothing above wrote engine state
        vault.allow(eligible, caller.into_bytes())?;
        vault.allow(eligible, subject.into_bytes())?;
        self.results.insert((project, subject), eligible);
        if policy.single_use {
            self.policies.deactivate(project);
        }
        self.events.record(EngineEvent::EligibilityChecked {
            project,
            subject,
            caller,
            policy_consumed: policy.single_use,
            at: unix_now(),
        });
        debug!(%project, %subject, %caller, "eligibility predicate evaluated");
        Ok(eligible)
    }

    /// Latest evaluator result for a (project, subject) pair
    pub fn result_of(&self, project: ProjectId, subject: Principal) -> Option<Handle> {
        self.results.get(&(project, subject)).copied()
    }

    // ---- proof ledger ----

    /// Mint an eligibility proof token for the caller
    ///
    /// Always re-evaluates; a stale result never backs a token. The
    /// token is an oblivious select between an encrypted nonzero digest
    /// and encrypted zero, so holding the handle reveals nothing about
    /// the verdict. Re-issuing replaces the token and is not an error.
    pub fn issue_proof(
        &mut self,
        vault: &mut CipherVault,
        caller: Principal,
        project: ProjectId,
    ) -> Result<Handle, EngineError> {
        let eligible = self.evaluate(vault, caller, project, caller)?;

        let now = unix_now();
        let candidate = vault.promote_u64(proof::token_value(caller, project, now))?;
        let zero = vault.promote_u64(0)?;
        let token = vault.select_u64(eligible, candidate, zero)?;

        vault.allow(token, caller.into_bytes())?;
        self.proofs.mark_issued(caller, project, token);
        self.events.record(EngineEvent::ProofIssued {
            project,
            subject: caller,
            at: now,
        });
        Ok(token)
    }

    /// Whether a proof was ever issued for the pair (plaintext read)
    pub fn has_proof(&self, subject: Principal, project: ProjectId) -> bool {
        self.proofs.has_proof(subject, project)
    }

    /// Latest proof record for the pair
    pub fn proof_of(&self, subject: Principal, project: ProjectId) -> Option<&ProofRecord> {
        self.proofs.get(subject, project)
    }

    // ---- events ----

    /// Events recorded so far
    pub fn events(&self) -> &[EngineEvent] {
        self.events.events()
    }

    /// Remove and return all recorded events
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain()
    }
}
