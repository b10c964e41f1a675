//! # Replicant Client
//! A participant in a replicant session. Spawns and updates the objects it
//! owns, mirrors every other object as a read-only proxy, and catches up from
//! a snapshot when it joins a session already in progress.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use replicant_shared::{
        BitReader, BitWrite, BitWriter, ChannelIndex, DeliveryMode, EndpointId, NetworkIdentity,
        Protocol, ReplicaType, Replicate, Serde, SerdeErr, SpawnHandle, SyncStatus, TypeCode,
        Version,
    };
}

mod client;
mod client_config;
mod error;
mod events;
mod transport;
mod world;

pub use client::Client;
pub use client_config::ClientConfig;
pub use error::ReplicantClientError;
pub use events::{
    ClientEvent, ClientEvents, ConnectEvent, ConnectionFailedEvent, DespawnEvent,
    DisconnectEvent, ErrorEvent, JoinFailedEvent, JoinRetryEvent, SpawnBoundEvent, SpawnEvent,
    SyncCompletedEvent, SyncStartedEvent, UpdateEvent,
};
pub use transport::Transport;
