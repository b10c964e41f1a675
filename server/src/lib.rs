//! # Replicant Server
//! The authoritative side of a replicant session. Allocates network
//! identities, enforces object ownership, relays spawn, update and despawn
//! traffic between endpoints, and brings late joiners up to date.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use replicant_shared::{
        BitReader, BitWrite, BitWriter, ChannelIndex, DeliveryMode, EndpointId, NetworkIdentity,
        Protocol, ReplicaType, Replicate, Serde, SerdeErr, SpawnHandle, TypeCode, Version,
    };
}

mod error;
mod events;
mod server;
mod transport;
mod world;

pub use error::{JoinError, ReplicantServerError};
pub use events::{
    ConnectEvent, DespawnEvent, DisconnectEvent, ErrorEvent, JoinAbortEvent, RejectEvent,
    ServerEvent, ServerEvents, SnapshotSentEvent, SpawnEvent, UpdateEvent,
};
pub use server::{HostPolicy, Server, ServerConfig, SnapshotSource};
pub use transport::Transport;
