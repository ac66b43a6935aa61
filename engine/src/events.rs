//! Observable engine events
//!
//! Each state change emits one event carrying only non-secret fields:
//! principals, project ids, timestamps, and plaintext flags. Attribute
//! values and ciphertext bytes never appear here. Events accumulate in
//! an append-only log the host can drain, and are mirrored to
//! `tracing` at info level.

use crate::types::{Principal, ProjectId};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A non-secret fact about an engine state change
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// A subject registered (or replaced) an identity record
    Submitted { subject: Principal, at: u64 },
    /// An authorized verifier attested a record
    Attested {
        subject: Principal,
        verifier: Principal,
        at: u64,
    },
    /// The administrator enabled or disabled a verifier
    VerifierChanged {
        principal: Principal,
        enabled: bool,
        changed: bool,
        at: u64,
    },
    /// A project policy was registered or replaced
    PolicyChanged {
        project: ProjectId,
        by: Principal,
        at: u64,
    },
    /// An eligibility check ran to completion (result stays encrypted)
    EligibilityChecked {
        project: ProjectId,
        subject: Principal,
        caller: Principal,
        policy_consumed: bool,
        at: u64,
    },
    /// A proof token was minted
    ProofIssued {
        project: ProjectId,
        subject: Principal,
        at: u64,
    },
}

/// Append-only event log
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<EngineEvent>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and mirror it to `tracing`
    pub fn record(&mut self, event: EngineEvent) {
        match &event {
            EngineEvent::Submitted { subject, .. } => {
                info!(%subject, "identity record submitted");
            }
            EngineEvent::Attested {
                subject, verifier, ..
            } => {
                info!(%subject, %verifier, "identity record attested");
            }
            EngineEvent::VerifierChanged {
                principal,
                enabled,
                changed,
                ..
            } => {
                info!(%principal, enabled, changed, "verifier set updated");
            }
            EngineEvent::PolicyChanged { project, by, .. } => {
                info!(%project, %by, "project policy replaced");
            }
            EngineEvent::EligibilityChecked {
                project,
                subject,
                caller,
                policy_consumed,
                ..
            } => {
                info!(%project, %subject, %caller, policy_consumed, "eligibility checked");
            }
            EngineEvent::ProofIssued {
                project, subject, ..
            } => {
                info!(%project, %subject, "eligibility proof issued");
            }
        }
        self.events.push(event);
    }

    /// Events recorded so far
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Remove and return all recorded events
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
