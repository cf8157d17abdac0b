//! Permission oracles.
//!
//! The engine never looks up permissions from ambient state. Callers pass
//! an oracle answering whether an actor holds a capability. Capabilities
//! are checked at system scope; no per-record context is involved.

use dashmap::DashMap;
use std::collections::HashSet;

use crate::core::{Actor, Capability};

/// Answers whether an actor holds a capability.
pub trait PermissionOracle: Send + Sync {
    /// Returns true if `actor` holds `capability`.
    fn has_capability(&self, capability: &Capability, actor: &Actor) -> bool;

    /// Checks an optional capability. An absent capability is never granted.
    fn permits(&self, capability: Option<&Capability>, actor: &Actor) -> bool {
        capability.is_some_and(|cap| self.has_capability(cap, actor))
    }
}

/// Oracle backed by an in-process grant table.
#[derive(Debug, Default)]
pub struct StaticPermissionOracle {
    grants: DashMap<Actor, HashSet<Capability>>,
}

impl StaticPermissionOracle {
    /// Creates an oracle with no grants.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants a capability and returns self for chaining.
    #[must_use]
    pub fn with_grant(self, actor: impl Into<Actor>, capability: impl Into<Capability>) -> Self {
        self.grant(actor, capability);
        self
    }

    /// Grants a capability.
    pub fn grant(&self, actor: impl Into<Actor>, capability: impl Into<Capability>) {
        self.grants
            .entry(actor.into())
            .or_default()
            .insert(capability.into());
    }

    /// Revokes a capability. Returns true if it was held.
    pub fn revoke(&self, actor: &Actor, capability: &Capability) -> bool {
        self.grants
            .get_mut(actor)
            .is_some_and(|mut caps| caps.remove(capability))
    }

    /// Capabilities held by an actor, sorted.
    #[must_use]
    pub fn capabilities_of(&self, actor: &Actor) -> Vec<Capability> {
        let mut caps: Vec<Capability> = self
            .grants
            .get(actor)
            .map(|caps| caps.iter().cloned().collect())
            .unwrap_or_default();
        caps.sort();
        caps
    }
}

impl PermissionOracle for StaticPermissionOracle {
    fn has_capability(&self, capability: &Capability, actor: &Actor) -> bool {
        self.grants
            .get(actor)
            .is_some_and(|caps| caps.contains(capability))
    }
}

/// Grants every concrete capability to every actor.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllOracle;

impl PermissionOracle for AllowAllOracle {
    fn has_capability(&self, _capability: &Capability, _actor: &Actor) -> bool {
        true
    }
}

/// Grants nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAllOracle;

impl PermissionOracle for DenyAllOracle {
    fn has_capability(&self, _capability: &Capability, _actor: &Actor) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_grants() {
        let oracle = StaticPermissionOracle::new().with_grant("alice", "local/roombooking:step1");
        let alice = Actor::new("alice");
        let bob = Actor::new("bob");
        let step1 = Capability::from("local/roombooking:step1");

        assert!(oracle.has_capability(&step1, &alice));
        assert!(!oracle.has_capability(&step1, &bob));
        assert!(!oracle.has_capability(&Capability::from("local/roombooking:step2"), &alice));
    }

    #[test]
    fn test_absent_capability_is_denied() {
        let alice = Actor::new("alice");
        assert!(!AllowAllOracle.permits(None, &alice));
        assert!(AllowAllOracle.permits(Some(&Capability::from("local/x:y")), &alice));
        assert!(!DenyAllOracle.permits(Some(&Capability::from("local/x:y")), &alice));
    }

    #[test]
    fn test_revoke() {
        let oracle = StaticPermissionOracle::new();
        oracle.grant("alice", "local/roombooking:step1");
        let alice = Actor::new("alice");
        let cap = Capability::from("local/roombooking:step1");

        assert!(oracle.revoke(&alice, &cap));
        assert!(!oracle.revoke(&alice, &cap));
        assert!(!oracle.has_capability(&cap, &alice));
    }

    #[test]
    fn test_capabilities_of() {
        let oracle = StaticPermissionOracle::new()
            .with_grant("alice", "local/roombooking:step2")
            .with_grant("alice", "local/roombooking:step1");

        let caps = oracle.capabilities_of(&Actor::new("alice"));
        assert_eq!(
            caps,
            vec![
                Capability::from("local/roombooking:step1"),
                Capability::from("local/roombooking:step2")
            ]
        );
        assert!(oracle.capabilities_of(&Actor::new("bob")).is_empty());
    }
}
