use replicant_serde::{BitReader, BitWrite, BitWriter, Serde, SerdeErr};

use crate::{
    messages::error::MessageError,
    types::{ChannelIndex, EndpointId, NetworkIdentity, SpawnHandle, TypeCode, Version},
    world::SnapshotEntry,
};

/// Everything exchanged between the authority and its participants.
///
/// Each message is encoded as a one byte tag followed by its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicationMessage {
    /// Participant → authority: the participant's registered type names
    Hello { type_names: Vec<String> },
    /// Authority → participant: connection accepted
    Welcome { endpoint: EndpointId },
    /// Authority → participant: connection refused, followed by a disconnect
    Rejected { reason: String },
    /// Participant → authority: please replicate this new object
    SpawnRequest {
        handle: SpawnHandle,
        type_code: TypeCode,
        state: Vec<u8>,
    },
    /// Authority → all: an object now exists. `handle` is set when a
    /// participant requested it.
    Spawned {
        type_code: TypeCode,
        identity: NetworkIdentity,
        owner: EndpointId,
        handle: Option<SpawnHandle>,
        state: Vec<u8>,
    },
    /// Owner → authority, authority → all others: one channel's new state
    Update {
        identity: NetworkIdentity,
        channel: ChannelIndex,
        version: Version,
        payload: Vec<u8>,
    },
    /// Owner → authority
    DespawnRequest { identity: NetworkIdentity },
    /// Authority → all: the object no longer exists
    Despawned { identity: NetworkIdentity },
    /// Authority → snapshot source: capture your directory for `target`
    SnapshotRequest { target: EndpointId },
    /// Snapshot source → authority
    SnapshotReply {
        target: EndpointId,
        entries: Vec<SnapshotEntry>,
    },
    /// Authority → joiner: how many entries follow
    SnapshotCount { count: u32 },
    /// Authority → joiner
    SnapshotEntry(SnapshotEntry),
    /// Authority → joiner: the snapshot source left, retry the join
    SnapshotAbort,
    /// Joiner → authority: restart my join
    JoinRetry,
    /// Authority → all: the session is over
    SessionEnded,
}

/// Discriminant of a `ReplicationMessage`, used for the wire tag and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReplicationMessageKind {
    Hello = 0,
    Welcome = 1,
    Rejected = 2,
    SpawnRequest = 3,
    Spawned = 4,
    Update = 5,
    DespawnRequest = 6,
    Despawned = 7,
    SnapshotRequest = 8,
    SnapshotReply = 9,
    SnapshotCount = 10,
    SnapshotEntry = 11,
    SnapshotAbort = 12,
    JoinRetry = 13,
    SessionEnded = 14,
}

impl ReplicationMessageKind {
    const ALL: [ReplicationMessageKind; 15] = [
        Self::Hello,
        Self::Welcome,
        Self::Rejected,
        Self::SpawnRequest,
        Self::Spawned,
        Self::Update,
        Self::DespawnRequest,
        Self::Despawned,
        Self::SnapshotRequest,
        Self::SnapshotReply,
        Self::SnapshotCount,
        Self::SnapshotEntry,
        Self::SnapshotAbort,
        Self::JoinRetry,
        Self::SessionEnded,
    ];

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    pub fn tag(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Hello => "Hello",
            Self::Welcome => "Welcome",
            Self::Rejected => "Rejected",
            Self::SpawnRequest => "SpawnRequest",
            Self::Spawned => "Spawned",
            Self::Update => "Update",
            Self::DespawnRequest => "DespawnRequest",
            Self::Despawned => "Despawned",
            Self::SnapshotRequest => "SnapshotRequest",
            Self::SnapshotReply => "SnapshotReply",
            Self::SnapshotCount => "SnapshotCount",
            Self::SnapshotEntry => "SnapshotEntry",
            Self::SnapshotAbort => "SnapshotAbort",
            Self::JoinRetry => "JoinRetry",
            Self::SessionEnded => "SessionEnded",
        }
    }
}

impl ReplicationMessage {
    pub fn kind(&self) -> ReplicationMessageKind {
        match self {
            Self::Hello { .. } => ReplicationMessageKind::Hello,
            Self::Welcome { .. } => ReplicationMessageKind::Welcome,
            Self::Rejected { .. } => ReplicationMessageKind::Rejected,
            Self::SpawnRequest { .. } => ReplicationMessageKind::SpawnRequest,
            Self::Spawned { .. } => ReplicationMessageKind::Spawned,
            Self::Update { .. } => ReplicationMessageKind::Update,
            Self::DespawnRequest { .. } => ReplicationMessageKind::DespawnRequest,
            Self::Despawned { .. } => ReplicationMessageKind::Despawned,
            Self::SnapshotRequest { .. } => ReplicationMessageKind::SnapshotRequest,
            Self::SnapshotReply { .. } => ReplicationMessageKind::SnapshotReply,
            Self::SnapshotCount { .. } => ReplicationMessageKind::SnapshotCount,
            Self::SnapshotEntry(_) => ReplicationMessageKind::SnapshotEntry,
            Self::SnapshotAbort => ReplicationMessageKind::SnapshotAbort,
            Self::JoinRetry => ReplicationMessageKind::JoinRetry,
            Self::SessionEnded => ReplicationMessageKind::SessionEnded,
        }
    }

    /// Spawn, update and despawn traffic, which a joining participant holds
    /// back until its snapshot is applied
    pub fn is_world_traffic(&self) -> bool {
        matches!(
            self,
            Self::Spawned { .. } | Self::Update { .. } | Self::Despawned { .. }
        )
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BitWriter::new();
        self.write(&mut writer);
        writer.to_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MessageError> {
        let mut reader = BitReader::new(bytes);
        let tag = reader.read_byte().map_err(|_| MessageError::Empty)?;
        let kind = ReplicationMessageKind::from_tag(tag).ok_or(MessageError::UnknownTag { tag })?;
        let message = Self::read_body(kind, &mut reader).map_err(|_| MessageError::Malformed {
            kind: kind.name(),
        })?;
        if !reader.is_finished() {
            return Err(MessageError::TrailingBytes {
                kind: kind.name(),
                bits: reader.bits_remaining(),
            });
        }
        Ok(message)
    }

    fn write(&self, writer: &mut dyn BitWrite) {
        writer.write_byte(self.kind().tag());
        match self {
            Self::Hello { type_names } => type_names.ser(writer),
            Self::Welcome { endpoint } => endpoint.ser(writer),
            Self::Rejected { reason } => reason.ser(writer),
            Self::SpawnRequest {
                handle,
                type_code,
                state,
            } => {
                handle.ser(writer);
                type_code.ser(writer);
                state.ser(writer);
            }
            Self::Spawned {
                type_code,
                identity,
                owner,
                handle,
                state,
            } => {
                type_code.ser(writer);
                identity.ser(writer);
                owner.ser(writer);
                handle.ser(writer);
                state.ser(writer);
            }
            Self::Update {
                identity,
                channel,
                version,
                payload,
            } => {
                identity.ser(writer);
                channel.ser(writer);
                version.ser(writer);
                payload.ser(writer);
            }
            Self::DespawnRequest { identity } | Self::Despawned { identity } => {
                identity.ser(writer)
            }
            Self::SnapshotRequest { target } => target.ser(writer),
            Self::SnapshotReply { target, entries } => {
                target.ser(writer);
                entries.ser(writer);
            }
            Self::SnapshotCount { count } => count.ser(writer),
            Self::SnapshotEntry(entry) => entry.ser(writer),
            Self::SnapshotAbort | Self::JoinRetry | Self::SessionEnded => {}
        }
    }

    fn read_body(kind: ReplicationMessageKind, reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let message = match kind {
            ReplicationMessageKind::Hello => Self::Hello {
                type_names: Vec::de(reader)?,
            },
            ReplicationMessageKind::Welcome => Self::Welcome {
                endpoint: EndpointId::de(reader)?,
            },
            ReplicationMessageKind::Rejected => Self::Rejected {
                reason: String::de(reader)?,
            },
            ReplicationMessageKind::SpawnRequest => Self::SpawnRequest {
                handle: SpawnHandle::de(reader)?,
                type_code: TypeCode::de(reader)?,
                state: Vec::de(reader)?,
            },
            ReplicationMessageKind::Spawned => Self::Spawned {
                type_code: TypeCode::de(reader)?,
                identity: NetworkIdentity::de(reader)?,
                owner: EndpointId::de(reader)?,
                handle: Option::de(reader)?,
                state: Vec::de(reader)?,
            },
            ReplicationMessageKind::Update => Self::Update {
                identity: NetworkIdentity::de(reader)?,
                channel: ChannelIndex::de(reader)?,
                version: Version::de(reader)?,
                payload: Vec::de(reader)?,
            },
            ReplicationMessageKind::DespawnRequest => Self::DespawnRequest {
                identity: NetworkIdentity::de(reader)?,
            },
            ReplicationMessageKind::Despawned => Self::Despawned {
                identity: NetworkIdentity::de(reader)?,
            },
            ReplicationMessageKind::SnapshotRequest => Self::SnapshotRequest {
                target: EndpointId::de(reader)?,
            },
            ReplicationMessageKind::SnapshotReply => Self::SnapshotReply {
                target: EndpointId::de(reader)?,
                entries: Vec::de(reader)?,
            },
            ReplicationMessageKind::SnapshotCount => Self::SnapshotCount {
                count: u32::de(reader)?,
            },
            ReplicationMessageKind::SnapshotEntry => Self::SnapshotEntry(SnapshotEntry::de(reader)?),
            ReplicationMessageKind::SnapshotAbort => Self::SnapshotAbort,
            ReplicationMessageKind::JoinRetry => Self::JoinRetry,
            ReplicationMessageKind::SessionEnded => Self::SessionEnded,
        };
        Ok(message)
    }
}
