use std::collections::{BTreeSet, HashMap};

use replicant_shared::{EndpointId, NetworkIdentity, ReplicationError};

/// The authority's record of who owns each live object.
/// Ownership is fixed at spawn and removed at despawn.
#[derive(Default)]
pub struct OwnershipTable {
    owners: HashMap<NetworkIdentity, EndpointId>,
    by_endpoint: HashMap<EndpointId, BTreeSet<NetworkIdentity>>,
}

impl OwnershipTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        identity: NetworkIdentity,
        owner: EndpointId,
    ) -> Result<(), ReplicationError> {
        if self.owners.contains_key(&identity) {
            return Err(ReplicationError::DuplicateIdentity { identity });
        }
        self.owners.insert(identity, owner);
        self.by_endpoint.entry(owner).or_default().insert(identity);
        Ok(())
    }

    pub fn owner(&self, identity: &NetworkIdentity) -> Option<EndpointId> {
        self.owners.get(identity).copied()
    }

    /// Ok only if `requester` owns the live object `identity`
    pub fn check_owner(
        &self,
        identity: &NetworkIdentity,
        requester: EndpointId,
    ) -> Result<(), ReplicationError> {
        let owner = self.owner(identity).ok_or(ReplicationError::ObjectNotFound {
            identity: *identity,
        })?;
        if owner != requester {
            return Err(ReplicationError::NotOwner {
                identity: *identity,
                requester,
                owner,
            });
        }
        Ok(())
    }

    pub fn remove(&mut self, identity: &NetworkIdentity) -> Option<EndpointId> {
        let owner = self.owners.remove(identity)?;
        if let Some(owned) = self.by_endpoint.get_mut(&owner) {
            owned.remove(identity);
            if owned.is_empty() {
                self.by_endpoint.remove(&owner);
            }
        }
        Some(owner)
    }

    /// Identities owned by `owner`, ascending
    pub fn owned_by(&self, owner: EndpointId) -> Vec<NetworkIdentity> {
        self.by_endpoint
            .get(&owner)
            .map(|owned| owned.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }
}
