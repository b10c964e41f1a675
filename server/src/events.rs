use std::{mem, vec::IntoIter};

use replicant_shared::{ChannelIndex, EndpointId, NetworkIdentity, Replicate};

use crate::ReplicantServerError;

/// Everything that happened during one call to `Server::receive`
pub struct ServerEvents {
    connections: Vec<EndpointId>,
    disconnections: Vec<EndpointId>,
    rejections: Vec<(EndpointId, String)>,
    spawns: Vec<(NetworkIdentity, EndpointId)>,
    despawns: Vec<(NetworkIdentity, Box<dyn Replicate>)>,
    updates: Vec<(NetworkIdentity, ChannelIndex)>,
    snapshots_sent: Vec<(EndpointId, u32)>,
    join_aborts: Vec<EndpointId>,
    errors: Vec<ReplicantServerError>,
    session_ended: Option<EndpointId>,

    empty: bool,
}

impl ServerEvents {
    pub(crate) fn new() -> Self {
        Self {
            connections: Vec::new(),
            disconnections: Vec::new(),
            rejections: Vec::new(),
            spawns: Vec::new(),
            despawns: Vec::new(),
            updates: Vec::new(),
            snapshots_sent: Vec::new(),
            join_aborts: Vec::new(),
            errors: Vec::new(),
            session_ended: None,

            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: ServerEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ServerEvent>(&self) -> bool {
        V::has(self)
    }

    /// The host whose departure ended the session, if it happened
    pub fn session_ended(&self) -> Option<EndpointId> {
        self.session_ended
    }

    // Crate-public

    pub(crate) fn push_connection(&mut self, endpoint: EndpointId) {
        self.connections.push(endpoint);
        self.empty = false;
    }

    pub(crate) fn push_disconnection(&mut self, endpoint: EndpointId) {
        self.disconnections.push(endpoint);
        self.empty = false;
    }

    pub(crate) fn push_rejection(&mut self, endpoint: EndpointId, reason: String) {
        self.rejections.push((endpoint, reason));
        self.empty = false;
    }

    pub(crate) fn push_spawn(&mut self, identity: NetworkIdentity, owner: EndpointId) {
        self.spawns.push((identity, owner));
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

    pub(crate) fn push_snapshot_sent(&mut self, target: EndpointId, count: u32) {
        self.snapshots_sent.push((target, count));
        self.empty = false;
    }

    pub(crate) fn push_join_abort(&mut self, target: EndpointId) {
        self.join_aborts.push(target);
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: ReplicantServerError) {
        self.errors.push(error);
        self.empty = false;
    }

    pub(crate) fn push_session_ended(&mut self, host: EndpointId) {
        self.session_ended = Some(host);
        self.empty = false;
    }
}

// Event Trait
pub trait ServerEvent {
    type Iter;

    fn iter(events: &mut ServerEvents) -> Self::Iter;

    fn has(events: &ServerEvents) -> bool;
}

macro_rules! server_event {
    ($(#[$meta:meta])* $name:ident, $field:ident, $item:ty) => {
        $(#[$meta])*
        pub struct $name;
        impl ServerEvent for $name {
            type Iter = IntoIter<$item>;

            fn iter(events: &mut ServerEvents) -> Self::Iter {
                IntoIterator::into_iter(mem::take(&mut events.$field))
            }

            fn has(events: &ServerEvents) -> bool {
                !events.$field.is_empty()
            }
        }
    };
}

server_event!(
    /// An endpoint passed the registry check
    ConnectEvent, connections, EndpointId
);
server_event!(
    /// An accepted endpoint went away
    DisconnectEvent, disconnections, EndpointId
);
server_event!(
    /// An endpoint was refused, with the reason sent to it
    RejectEvent, rejections, (EndpointId, String)
);
server_event!(SpawnEvent, spawns, (NetworkIdentity, EndpointId));
server_event!(
    /// Despawned object, already finalized
    DespawnEvent, despawns, (NetworkIdentity, Box<dyn Replicate>)
);
server_event!(UpdateEvent, updates, (NetworkIdentity, ChannelIndex));
server_event!(
    /// A joining endpoint was sent a snapshot of this many entries
    SnapshotSentEvent, snapshots_sent, (EndpointId, u32)
);
server_event!(
    /// A join was abandoned because its snapshot source left
    JoinAbortEvent, join_aborts, EndpointId
);
server_event!(ErrorEvent, errors, ReplicantServerError);
