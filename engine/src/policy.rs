//! Per-project eligibility policies
//!
//! Plaintext rule table keyed by project id. Writes replace the whole
//! policy; there are no partial updates.

use crate::errors::EngineError;
use crate::types::ProjectId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Upper bound on the allowed-country list
///
/// The country check is an OR-fold of one encrypted equality per entry,
/// so the list length is the homomorphic cost of every evaluation.
pub const MAX_ALLOWED_COUNTRIES: usize = 32;

/// Policy fields as supplied by the policy creator
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicySpec {
    /// Minimum age in years
    pub min_age: u32,
    /// Country codes accepted by this project, in registration order
    pub allowed_countries: Vec<u8>,
    /// Whether a passport must be on file
    pub requires_passport: bool,
    /// Deactivate the policy after its first successful evaluation
    pub single_use: bool,
}

/// A registered policy
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectPolicy {
    pub min_age: u32,
    pub allowed_countries: Vec<u8>,
    pub requires_passport: bool,
    pub single_use: bool,
    /// True from (re)registration until deactivation
    pub active: bool,
}

/// Keyed table of project policies
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PolicyRegistry {
    policies: HashMap<ProjectId, ProjectPolicy>,
}

impl PolicyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a policy, replacing any prior one wholesale
    ///
    /// The new policy is active regardless of the prior one's state.
    pub fn set(&mut self, project: ProjectId, spec: PolicySpec) -> Result<(), EngineError> {
        if spec.allowed_countries.len() > MAX_ALLOWED_COUNTRIES {
            return Err(EngineError::policy_too_large(spec.allowed_countries.len()));
        }
        self.policies.insert(
            project,
            ProjectPolicy {
                min_age: spec.min_age,
                allowed_countries: spec.allowed_countries,
                requires_passport: spec.requires_passport,
                single_use: spec.single_use,
                active: true,
            },
        );
        Ok(())
    }

    /// Look up a policy
    pub fn get(&self, project: ProjectId) -> Option<&ProjectPolicy> {
        self.policies.get(&project)
    }

    /// Deactivate a policy (single-use consumption)
    pub fn deactivate(&mut self, project: ProjectId) {
        if let Some(policy) = self.policies.get_mut(&project) {
            policy.active = false;
        }
    }

    /// Number of registered policies, active or not
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Check whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
