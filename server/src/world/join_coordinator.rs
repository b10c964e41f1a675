use std::collections::{BTreeMap, BTreeSet};

use replicant_shared::EndpointId;

use crate::error::JoinError;

/// Joins waiting on a snapshot reply, keyed by the joining endpoint.
///
/// A join with no entry here is idle: either finished or served straight
/// from the authority's own directory. Joins abandoned because their source
/// left are remembered until the target retries or goes away.
#[derive(Default)]
pub struct JoinCoordinator {
    awaiting: BTreeMap<EndpointId, EndpointId>,
    abandoned: BTreeSet<EndpointId>,
}

impl JoinCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts waiting for `source` to reply on behalf of `target`,
    /// replacing any earlier attempt for the same target
    pub fn begin(&mut self, target: EndpointId, source: EndpointId) {
        self.abandoned.remove(&target);
        self.awaiting.insert(target, source);
    }

    /// Accepts a reply if it comes from the source asked for `target`
    pub fn complete(&mut self, target: EndpointId, from: EndpointId) -> Result<(), JoinError> {
        let Some(expected) = self.awaiting.get(&target).copied() else {
            return Err(JoinError::UnknownJoin { target });
        };
        if expected != from {
            return Err(JoinError::WrongSource {
                target,
                from,
                expected,
            });
        }
        self.awaiting.remove(&target);
        Ok(())
    }

    /// Drops the pending or abandoned join of a target. Returns whether it
    /// was still waiting on a source.
    pub fn cancel(&mut self, target: EndpointId) -> bool {
        self.abandoned.remove(&target);
        self.awaiting.remove(&target).is_some()
    }

    /// Abandons every join waiting on `source`, returning their targets
    /// in ascending order
    pub fn source_lost(&mut self, source: EndpointId) -> Vec<EndpointId> {
        let targets: Vec<EndpointId> = self
            .awaiting
            .iter()
            .filter(|(_, waiting_on)| **waiting_on == source)
            .map(|(target, _)| *target)
            .collect();
        for target in &targets {
            self.awaiting.remove(target);
            self.abandoned.insert(*target);
        }
        targets
    }

    /// A target may restart its join only while one is pending or abandoned
    pub fn may_retry(&self, target: &EndpointId) -> bool {
        self.awaiting.contains_key(target) || self.abandoned.contains(target)
    }

    pub fn source_of(&self, target: &EndpointId) -> Option<EndpointId> {
        self.awaiting.get(target).copied()
    }
}
