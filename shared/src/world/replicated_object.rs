use replicant_serde::{BitReader, BitWriter};

use crate::{
    error::ReplicationError,
    types::{ChannelIndex, EndpointId, NetworkIdentity, TypeCode, Version},
    world::{
        replicate::{ReplicaType, Replicate},
        version_guard::VersionGuard,
    },
};

/// A directory entry: the local instance of a replicated object plus the
/// metadata every participant tracks for it
pub struct ReplicatedObject {
    identity: NetworkIdentity,
    owner: EndpointId,
    type_code: TypeCode,
    versions: VersionGuard,
    replica: Box<dyn Replicate>,
}

impl ReplicatedObject {
    pub fn new(
        identity: NetworkIdentity,
        owner: EndpointId,
        type_code: TypeCode,
        replica: Box<dyn Replicate>,
    ) -> Self {
        Self {
            identity,
            owner,
            type_code,
            versions: VersionGuard::new(),
            replica,
        }
    }

    pub fn identity(&self) -> NetworkIdentity {
        self.identity
    }

    pub fn owner(&self) -> EndpointId {
        self.owner
    }

    pub fn type_code(&self) -> TypeCode {
        self.type_code
    }

    pub fn versions(&self) -> &VersionGuard {
        &self.versions
    }

    pub fn versions_mut(&mut self) -> &mut VersionGuard {
        &mut self.versions
    }

    pub fn replica(&self) -> &dyn Replicate {
        self.replica.as_ref()
    }

    pub fn replica_mut(&mut self) -> &mut dyn Replicate {
        self.replica.as_mut()
    }

    pub fn downcast_ref<R: ReplicaType>(&self) -> Option<&R> {
        self.replica.as_any().downcast_ref::<R>()
    }

    pub fn downcast_mut<R: ReplicaType>(&mut self) -> Option<&mut R> {
        self.replica.as_any_mut().downcast_mut::<R>()
    }

    pub fn into_replica(self) -> Box<dyn Replicate> {
        self.replica
    }

    /// Full state, as carried by spawn and snapshot messages
    pub fn state_bytes(&self) -> Vec<u8> {
        let mut writer = BitWriter::new();
        self.replica.write(&mut writer);
        writer.to_bytes()
    }

    pub fn check_channel(&self, channel: ChannelIndex) -> Result<(), ReplicationError> {
        if (channel as usize) < self.replica.channels().len() {
            Ok(())
        } else {
            Err(ReplicationError::InvalidChannel {
                identity: self.identity,
                channel,
                type_name: self.replica.type_name(),
            })
        }
    }

    /// Encodes one channel for an outgoing update and claims its version
    pub fn write_update(&mut self, channel: ChannelIndex) -> Result<(Version, Vec<u8>), ReplicationError> {
        self.check_channel(channel)?;
        let version = self.versions.next_outgoing(channel);
        let mut writer = BitWriter::new();
        self.replica.write_channel(channel, &mut writer);
        Ok((version, writer.to_bytes()))
    }

    /// Applies a received channel update if its version is newer than the
    /// last one applied. A stale or undecodable update changes nothing.
    pub fn apply_update(
        &mut self,
        channel: ChannelIndex,
        version: Version,
        payload: &[u8],
    ) -> Result<(), ReplicationError> {
        self.check_channel(channel)?;
        if !self.versions.accepts(channel, version) {
            return Err(ReplicationError::StaleVersion {
                identity: self.identity,
                channel,
                version,
                last: self.versions.last(channel),
            });
        }
        let mut reader = BitReader::new(payload);
        self.replica
            .read_channel(channel, &mut reader)
            .map_err(|_| ReplicationError::Decode {
                type_name: self.replica.type_name(),
            })?;
        self.versions.try_apply(channel, version);
        Ok(())
    }

    /// Overwrites the full state, as when a snapshot entry lands on an
    /// object that already exists locally
    pub fn apply_state(&mut self, state: &[u8]) -> Result<(), ReplicationError> {
        let mut reader = BitReader::new(state);
        self.replica
            .read_apply(&mut reader)
            .map_err(|_| ReplicationError::Decode {
                type_name: self.replica.type_name(),
            })
    }

    pub fn finalize(&mut self) {
        self.replica.finalize();
    }

    pub(crate) fn set_owner(&mut self, owner: EndpointId) {
        self.owner = owner;
    }

    /// Swaps in a replica of another type, finalizing the old one
    pub(crate) fn replace_replica(&mut self, type_code: TypeCode, replica: Box<dyn Replicate>) {
        self.replica.finalize();
        self.type_code = type_code;
        self.replica = replica;
    }
}
