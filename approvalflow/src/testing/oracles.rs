//! Recording oracle for testing.

use parking_lot::Mutex;

use crate::core::{Actor, Capability};
use crate::permissions::PermissionOracle;

/// Wraps an oracle and records every capability query.
#[derive(Debug)]
pub struct RecordingPermissionOracle<O> {
    inner: O,
    queries: Mutex<Vec<(Capability, Actor)>>,
}

impl<O: PermissionOracle> RecordingPermissionOracle<O> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// The wrapped oracle.
    #[must_use]
    pub fn inner(&self) -> &O {
        &self.inner
    }

    /// Number of queries made so far.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.queries.lock().len()
    }

    /// Queries made so far, oldest first.
    #[must_use]
    pub fn queries(&self) -> Vec<(Capability, Actor)> {
        self.queries.lock().clone()
    }

    /// Forgets recorded queries.
    pub fn reset(&self) {
        self.queries.lock().clear();
    }
}

impl<O: PermissionOracle> PermissionOracle for RecordingPermissionOracle<O> {
    fn has_capability(&self, capability: &Capability, actor: &Actor) -> bool {
        self.queries.lock().push((capability.clone(), actor.clone()));
        self.inner.has_capability(capability, actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{DenyAllOracle, StaticPermissionOracle};

    #[test]
    fn test_records_and_delegates() {
        let oracle = RecordingPermissionOracle::new(
            StaticPermissionOracle::new().with_grant("alice", "local/roombooking:step1"),
        );
        let alice = Actor::new("alice");

        assert!(oracle.has_capability(&"local/roombooking:step1".into(), &alice));
        assert!(!oracle.has_capability(&"local/roombooking:step2".into(), &alice));
        assert_eq!(oracle.query_count(), 2);
        assert_eq!(oracle.queries()[1].0.as_str(), "local/roombooking:step2");

        oracle.reset();
        assert_eq!(oracle.query_count(), 0);
    }

    #[test]
    fn test_absent_capability_is_not_queried() {
        let oracle = RecordingPermissionOracle::new(DenyAllOracle);
        assert!(!oracle.permits(None, &Actor::new("bob")));
        assert_eq!(oracle.query_count(), 0);
    }
}
