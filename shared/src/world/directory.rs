use std::collections::HashMap;

use log::{debug, warn};

use crate::{
    error::ReplicationError,
    types::{ChannelIndex, EndpointId, NetworkIdentity, Version},
    world::{
        replicate::ReplicaType, replicated_object::ReplicatedObject, snapshot::SnapshotEntry,
        type_registry::TypeRegistry,
    },
};

/// Every live object a participant knows about, keyed by network identity
#[derive(Default)]
pub struct Directory {
    objects: HashMap<NetworkIdentity, ReplicatedObject>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: ReplicatedObject) -> Result<(), ReplicationError> {
        let identity = object.identity();
        if self.objects.contains_key(&identity) {
            return Err(ReplicationError::DuplicateIdentity { identity });
        }
        self.objects.insert(identity, object);
        Ok(())
    }

    pub fn contains(&self, identity: &NetworkIdentity) -> bool {
        self.objects.contains_key(identity)
    }

    pub fn get(&self, identity: &NetworkIdentity) -> Option<&ReplicatedObject> {
        self.objects.get(identity)
    }

    pub fn get_mut(&mut self, identity: &NetworkIdentity) -> Option<&mut ReplicatedObject> {
        self.objects.get_mut(identity)
    }

    pub fn replica<R: ReplicaType>(&self, identity: &NetworkIdentity) -> Option<&R> {
        self.objects.get(identity)?.downcast_ref::<R>()
    }

    /// Removes and finalizes an object. None if it was already gone.
    pub fn despawn(&mut self, identity: &NetworkIdentity) -> Option<ReplicatedObject> {
        let mut object = self.objects.remove(identity)?;
        object.finalize();
        Some(object)
    }

    /// Applies a channel update, checking the channel and version first
    pub fn apply_update(
        &mut self,
        identity: &NetworkIdentity,
        channel: ChannelIndex,
        version: Version,
        payload: &[u8],
    ) -> Result<(), ReplicationError> {
        self.objects
            .get_mut(identity)
            .ok_or(ReplicationError::ObjectNotFound {
                identity: *identity,
            })?
            .apply_update(channel, version, payload)
    }

    /// Identities owned by `owner`, ascending
    pub fn owned_by(&self, owner: EndpointId) -> Vec<NetworkIdentity> {
        let mut output: Vec<NetworkIdentity> = self
            .objects
            .values()
            .filter(|object| object.owner() == owner)
            .map(|object| object.identity())
            .collect();
        output.sort_unstable();
        output
    }

    /// All identities, ascending
    pub fn identities(&self) -> Vec<NetworkIdentity> {
        let mut output: Vec<NetworkIdentity> = self.objects.keys().copied().collect();
        output.sort_unstable();
        output
    }

    /// Captures every live object, ascending by identity
    pub fn capture_snapshot(&self) -> Vec<SnapshotEntry> {
        self.identities()
            .iter()
            .filter_map(|identity| self.objects.get(identity))
            .map(|object| SnapshotEntry {
                type_code: object.type_code(),
                identity: object.identity(),
                owner: object.owner(),
                versions: object.versions().versions(),
                state: object.state_bytes(),
            })
            .collect()
    }

    /// Applies one snapshot entry. A missing object is created through the
    /// registry; an existing one has its state overwritten, and takes the
    /// entry's owner and type if they differ. Channel versions are raised to
    /// the captured ones either way. Returns true if a new object was created.
    pub fn apply_snapshot_entry(
        &mut self,
        registry: &TypeRegistry,
        entry: &SnapshotEntry,
    ) -> Result<bool, ReplicationError> {
        if let Some(object) = self.objects.get_mut(&entry.identity) {
            debug!("Snapshot entry {} overwrites existing object", entry.identity);
            if object.type_code() == entry.type_code {
                object.apply_state(&entry.state)?;
            } else {
                warn!(
                    "Snapshot entry {} has type code {}, local object has {}. Replacing it",
                    entry.identity,
                    entry.type_code,
                    object.type_code()
                );
                let replica = registry.create(entry.type_code, &entry.state)?;
                object.replace_replica(entry.type_code, replica);
            }
            if object.owner() != entry.owner {
                warn!(
                    "Snapshot entry {} is owned by {}, local object by {}. Taking the snapshot owner",
                    entry.identity,
                    entry.owner,
                    object.owner()
                );
                object.set_owner(entry.owner);
            }
            object.versions_mut().seed(&entry.versions);
            return Ok(false);
        }

        let replica = registry.create(entry.type_code, &entry.state)?;
        let mut object = ReplicatedObject::new(entry.identity, entry.owner, entry.type_code, replica);
        object.versions_mut().seed(&entry.versions);
        self.objects.insert(entry.identity, object);
        Ok(true)
    }

    /// Finalizes and removes everything, ascending by identity
    pub fn clear(&mut self) -> Vec<ReplicatedObject> {
        self.identities()
            .iter()
            .filter_map(|identity| self.despawn(identity))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
