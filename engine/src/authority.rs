//! Verifier authority
//!
//! A single immutable administrator plus a plaintext set of enabled
//! verifiers. The table is an explicit value owned by the engine
//! instance so engines are instantiable and testable in isolation.

use crate::errors::EngineError;
use crate::types::Principal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Access-control table for attestation and policy rights
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthorityTable {
    administrator: Principal,
    verifiers: BTreeSet<Principal>,
}

impl AuthorityTable {
    /// Create a table with the given administrator and no verifiers
    pub fn new(administrator: Principal) -> Self {
        Self {
            administrator,
            verifiers: BTreeSet::new(),
        }
    }

    /// The immutable administrator principal
    pub fn administrator(&self) -> Principal {
        self.administrator
    }

    /// Enable or disable a verifier
    ///
    /// Only the administrator may call. Returns whether the set
    /// actually changed; a no-op change is not an error.
    pub fn set_verifier(
        &mut self,
        caller: Principal,
        principal: Principal,
        enabled: bool,
    ) -> Result<bool, EngineError> {
        if caller != self.administrator {
            return Err(EngineError::OnlyAdmin(caller));
        }
        let changed = if enabled {
            self.verifiers.insert(principal)
        } else {
            self.verifiers.remove(&principal)
        };
        Ok(changed)
    }

    /// True iff `principal` is the administrator or an enabled verifier
    pub fn is_authorized(&self, principal: Principal) -> bool {
        principal == self.administrator || self.verifiers.contains(&principal)
    }

    /// Number of enabled verifiers (administrator excluded)
    pub fn verifier_count(&self) -> usize {
        self.verifiers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> (AuthorityTable, Principal) {
        let admin = Principal::from_bytes([1u8; 32]);
        (AuthorityTable::new(admin), admin)
    }

    #[test]
    fn administrator_is_always_authorized() {
        let (table, admin) = table();
        assert!(table.is_authorized(admin));
        assert!(!table.is_authorized(Principal::from_bytes([2u8; 32])));
    }

    #[test]
    fn only_admin_manages_the_set() {
        let (mut table, admin) = table();
        let verifier = Principal::from_bytes([2u8; 32]);
        let stranger = Principal::from_bytes([3u8; 32]);

        assert!(matches!(
            table.set_verifier(stranger, verifier, true),
            Err(EngineError::OnlyAdmin(p)) if p == stranger
        ));

        table.set_verifier(admin, verifier, true).unwrap();
        assert!(table.is_authorized(verifier));

        table.set_verifier(admin, verifier, false).unwrap();
        assert!(!table.is_authorized(verifier));
    }

    #[test]
    fn enabling_twice_is_a_state_noop() {
        let (mut table, admin) = table();
        let verifier = Principal::from_bytes([2u8; 32]);

        assert!(table.set_verifier(admin, verifier, true).unwrap());
        assert!(!table.set_verifier(admin, verifier, true).unwrap());
        assert_eq!(table.verifier_count(), 1);
    }
}
