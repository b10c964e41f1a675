use log::{debug, error, trace, warn};
use thiserror::Error;

use crate::{
    types::{ChannelIndex, EndpointId, NetworkIdentity, TypeCode, Version},
    world::RegistryError,
};

/// Errors raised while applying replication traffic or local replication calls
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicationError {
    /// Identity already present in a directory or ownership table
    #[error("Object {identity} is already present. Network identities are allocated once and never reused")]
    DuplicateIdentity { identity: NetworkIdentity },

    /// Mutation attempted by an endpoint that does not own the object
    #[error("{requester} does not own object {identity} (owner is {owner}). Only the owner may update or despawn an object")]
    NotOwner {
        identity: NetworkIdentity,
        requester: EndpointId,
        owner: EndpointId,
    },

    /// Type code absent from the local registry
    #[error("Type code {type_code} is not registered. Both sides must register the same types in the same order")]
    UnknownType { type_code: TypeCode },

    /// Update at or below the last applied version for its channel
    #[error("Update for object {identity} channel {channel} has version {version}, but version {last} was already applied")]
    StaleVersion {
        identity: NetworkIdentity,
        channel: ChannelIndex,
        version: Version,
        last: Version,
    },

    /// Snapshot source disconnected before replying
    #[error("Snapshot source {snapshot_source} disconnected before replying for joining {target}. The join must be retried")]
    SnapshotSourceLost {
        snapshot_source: EndpointId,
        target: EndpointId,
    },

    /// The session host left and the session ended
    #[error("Host {host} disconnected. The session has ended")]
    HostDisconnected { host: EndpointId },

    /// Object referenced by a message or call does not exist
    #[error("Object {identity} was not found. It may not be spawned yet or may already be despawned")]
    ObjectNotFound { identity: NetworkIdentity },

    /// Channel index not declared by the object's type
    #[error("Channel {channel} is not declared by type '{type_name}' (object {identity})")]
    InvalidChannel {
        identity: NetworkIdentity,
        channel: ChannelIndex,
        type_name: &'static str,
    },

    /// Replicated state could not be decoded
    #[error("Failed to decode replicated state of type '{type_name}'. The payload is malformed or truncated")]
    Decode { type_name: &'static str },

    /// Peer registered a different list of replicated types
    #[error("Type registry mismatch. Expected {expected:?}, peer registered {received:?}")]
    RegistryMismatch {
        expected: Vec<String>,
        received: Vec<String>,
    },

    /// A local operation that requires an accepted connection
    #[error("Not connected to an authority. Wait for a connection event before replicating objects")]
    NotConnected,

    /// The session has ended
    #[error("The session has ended and no longer accepts replication operations")]
    SessionHalted,

    /// Every network identity has been handed out
    #[error("Network identities are exhausted. No further objects can be spawned this session")]
    IdentitiesExhausted,

    /// Local replica type was never registered
    #[error("{0}")]
    Registry(RegistryError),
}

impl From<RegistryError> for ReplicationError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::UnknownTypeCode { type_code } => Self::UnknownType { type_code },
            RegistryError::Decode { type_name } => Self::Decode { type_name },
            other => Self::Registry(other),
        }
    }
}

impl ReplicationError {
    /// Logs a message that was dropped because of this error, at the level
    /// appropriate for its kind
    pub fn log_dropped(&self, from: EndpointId) {
        match self {
            Self::StaleVersion { .. } => trace!("Dropped message from {}: {}", from, self),
            Self::ObjectNotFound { .. } | Self::DuplicateIdentity { .. } => {
                debug!("Dropped message from {}: {}", from, self)
            }
            Self::UnknownType { .. } | Self::RegistryMismatch { .. } => {
                error!("Dropped message from {}: {}", from, self)
            }
            _ => warn!("Dropped message from {}: {}", from, self),
        }
    }
}
