#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use replicant_serde::{
    BitCounter, BitReader, BitWrite, BitWriter, Serde, SerdeErr, UnsignedVariableInteger,
};

mod error;
mod messages;
mod protocol;
mod transport;
mod types;
mod world;

pub use error::ReplicationError;
pub use messages::{DeliveryMode, MessageError, ReplicationMessage, ReplicationMessageKind};
pub use protocol::{Protocol, ProtocolError, ProtocolPlugin};
pub use transport::{
    ingest_channel, IngestError, IngestReceiver, IngestSender, SendError, TransportEvent,
};
pub use types::{ChannelIndex, EndpointId, NetworkIdentity, SpawnHandle, TypeCode, Version};
pub use world::{
    Directory, RegistryError, ReplicaType, Replicate, ReplicateBuilder, ReplicatedObject,
    SnapshotEntry, SyncError, SyncProgress, SyncState, SyncStatus, TypeRegistry, VersionGuard,
};
