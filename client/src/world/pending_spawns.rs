use std::collections::BTreeMap;

use replicant_shared::{Replicate, SpawnHandle, TypeCode};

pub struct PendingSpawn {
    pub type_code: TypeCode,
    pub replica: Box<dyn Replicate>,
}

/// Objects this Client has spawned that the authority has not confirmed yet.
/// Each waits under the handle sent with its spawn request.
pub struct PendingSpawns {
    next_handle: u32,
    pending: BTreeMap<SpawnHandle, PendingSpawn>,
}

impl PendingSpawns {
    pub fn new() -> Self {
        Self {
            next_handle: 0,
            pending: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, type_code: TypeCode, replica: Box<dyn Replicate>) -> SpawnHandle {
        let handle = SpawnHandle::new(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.pending
            .insert(handle, PendingSpawn { type_code, replica });
        handle
    }

    pub fn take(&mut self, handle: &SpawnHandle) -> Option<PendingSpawn> {
        self.pending.remove(handle)
    }

    pub fn get(&self, handle: &SpawnHandle) -> Option<&PendingSpawn> {
        self.pending.get(handle)
    }

    /// Pending spawns in the order they were made
    pub fn iter(&self) -> impl Iterator<Item = (&SpawnHandle, &PendingSpawn)> {
        self.pending.iter()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
