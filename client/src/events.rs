use std::{mem, vec::IntoIter};

use replicant_shared::{ChannelIndex, EndpointId, NetworkIdentity, Replicate, SpawnHandle};

use crate::ReplicantClientError;

/// Everything that happened during one call to `Client::receive`
pub struct ClientEvents {
    connections: Vec<EndpointId>,
    connection_failures: Vec<String>,
    disconnections: Vec<EndpointId>,
    spawns: Vec<(NetworkIdentity, EndpointId)>,
    spawn_bindings: Vec<(SpawnHandle, NetworkIdentity)>,
    despawns: Vec<(NetworkIdentity, Box<dyn Replicate>)>,
    updates: Vec<(NetworkIdentity, ChannelIndex)>,
    syncs_started: Vec<u32>,
    syncs_completed: Vec<usize>,
    join_retries: Vec<u8>,
    join_failures: Vec<u8>,
    errors: Vec<ReplicantClientError>,
    session_ended: bool,

    empty: bool,
}

impl Default for ClientEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientEvents {
    pub(crate) fn new() -> Self {
        Self {
            connections: Vec::new(),
            connection_failures: Vec::new(),
            disconnections: Vec::new(),
            spawns: Vec::new(),
            spawn_bindings: Vec::new(),
            despawns: Vec::new(),
            updates: Vec::new(),
            syncs_started: Vec::new(),
            syncs_completed: Vec::new(),
            join_retries: Vec::new(),
            join_failures: Vec::new(),
            errors: Vec::new(),
            session_ended: false,

            empty: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: ClientEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ClientEvent>(&self) -> bool {
        V::has(self)
    }

    /// Returns whether the authority announced the end of the session
    pub fn session_ended(&self) -> bool {
        self.session_ended
    }

    pub(crate) fn push_connection(&mut self, endpoint: EndpointId) {
        self.connections.push(endpoint);
        self.empty = false;
    }

    pub(crate) fn push_connection_failure(&mut self, reason: String) {
        self.connection_failures.push(reason);
        self.empty = false;
    }

    pub(crate) fn push_disconnection(&mut self, endpoint: EndpointId) {
        self.disconnections.push(endpoint);
        self.empty = false;
    }

    pub(crate) fn push_spawn(&mut self, identity: NetworkIdentity, owner: EndpointId) {
        self.spawns.push((identity, owner));
        self.empty = false;
    }

    pub(crate) fn push_spawn_binding(&mut self, handle: SpawnHandle, identity: NetworkIdentity) {
        self.spawn_bindings.push((handle, identity));
        self.empty = false;
    }

    pub(crate) fn push_despawn(&mut self, identity: NetworkIdentity, replica: Box<dyn Replicate>) {
        self.despawns.push((identity, replica));
        self.empty = false;
    }

    pub(crate) fn push_update(&mut self, identity: NetworkIdentity, channel: ChannelIndex) {
        self.updates.push((identity, channel));
        self.empty = false;
    }

    pub(crate) fn push_sync_started(&mut self, count: u32) {
        self.syncs_started.push(count);
        self.empty = false;
    }

    pub(crate) fn push_sync_completed(&mut self, replayed: usize) {
        self.syncs_completed.push(replayed);
        self.empty = false;
    }

    pub(crate) fn push_join_retry(&mut self, attempt: u8) {
        self.join_retries.push(attempt);
        self.empty = false;
    }

    pub(crate) fn push_join_failure(&mut self, attempts: u8) {
        self.join_failures.push(attempts);
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: ReplicantClientError) {
        self.errors.push(error);
        self.empty = false;
    }

    pub(crate) fn push_session_ended(&mut self) {
        self.session_ended = true;
        self.empty = false;
    }
}

// Event Trait
pub trait ClientEvent {
    type Iter;

    fn iter(events: &mut ClientEvents) -> Self::Iter;

    fn has(events: &ClientEvents) -> bool;
}

macro_rules! client_event {
    ($(#[$meta:meta])* $name:ident, $field:ident, $item:ty) => {
        $(#[$meta])*
        pub struct $name;
        impl ClientEvent for $name {
            type Iter = IntoIter<$item>;

            fn iter(events: &mut ClientEvents) -> Self::Iter {
                IntoIterator::into_iter(mem::take(&mut events.$field))
            }

            fn has(events: &ClientEvents) -> bool {
                !events.$field.is_empty()
            }
        }
    };
}

client_event!(
    /// The authority accepted this Client under the given endpoint id
    ConnectEvent, connections, EndpointId
);
client_event!(
    /// The connection was refused or dropped before it was accepted
    ConnectionFailedEvent, connection_failures, String
);
client_event!(DisconnectEvent, disconnections, EndpointId);
client_event!(
    /// An object owned by someone else now exists locally
    SpawnEvent, spawns, (NetworkIdentity, EndpointId)
);
client_event!(
    /// One of this Client's own spawns was confirmed and given an identity
    SpawnBoundEvent, spawn_bindings, (SpawnHandle, NetworkIdentity)
);
client_event!(
    /// Despawned object, already finalized
    DespawnEvent, despawns, (NetworkIdentity, Box<dyn Replicate>)
);
client_event!(UpdateEvent, updates, (NetworkIdentity, ChannelIndex));
client_event!(
    /// A snapshot of this many entries is arriving
    SyncStartedEvent, syncs_started, u32
);
client_event!(
    /// The snapshot was applied; carries how many held-back messages were replayed
    SyncCompletedEvent, syncs_completed, usize
);
client_event!(
    /// The snapshot source was lost and the join is being retried
    JoinRetryEvent, join_retries, u8
);
client_event!(
    /// The join was abandoned after this many retries
    JoinFailedEvent, join_failures, u8
);
client_event!(ErrorEvent, errors, ReplicantClientError);
