use log::{debug, info, warn};

use replicant_shared::{
    BitWriter, ChannelIndex, EndpointId, NetworkIdentity, ReplicaType, ReplicatedObject,
    ReplicationError, ReplicationMessage, SpawnHandle, TypeCode, Version,
};

use super::client::Client;
use crate::ReplicantClientError;

impl Client {
    // Spawning

    /// Creates an object owned by this Client. The object waits under the
    /// returned handle until the authority assigns it an identity.
    pub fn spawn<R: ReplicaType>(&mut self, replica: R) -> Result<SpawnHandle, ReplicantClientError> {
        self.check_running()?;
        if !self.is_connected() {
            return Err(ReplicationError::NotConnected.into());
        }
        let type_code = self
            .registry
            .type_code_of::<R>()
            .map_err(ReplicationError::from)?;

        let mut writer = BitWriter::new();
        replica.write(&mut writer);
        let state = writer.to_bytes();

        let handle = self.pending_spawns.insert(type_code, Box::new(replica));
        debug!("requesting spawn {:?}", handle);
        self.send(
            &ReplicationMessage::SpawnRequest {
                handle,
                type_code,
                state,
            },
            self.lifecycle_delivery,
        );
        Ok(handle)
    }

    /// Sends every unconfirmed spawn request again. The authority answers a
    /// repeated request with the identity it already assigned.
    pub fn resend_pending_spawns(&mut self) {
        let requests: Vec<ReplicationMessage> = self
            .pending_spawns
            .iter()
            .map(|(handle, pending)| {
                let mut writer = BitWriter::new();
                pending.replica.write(&mut writer);
                ReplicationMessage::SpawnRequest {
                    handle: *handle,
                    type_code: pending.type_code,
                    state: writer.to_bytes(),
                }
            })
            .collect();
        for request in requests {
            self.send(&request, self.lifecycle_delivery);
        }
    }

    pub fn pending_spawn_count(&self) -> usize {
        self.pending_spawns.len()
    }

    /// An object spawned locally that has no identity yet
    pub fn pending_replica<R: ReplicaType>(&self, handle: &SpawnHandle) -> Option<&R> {
        self.pending_spawns
            .get(handle)?
            .replica
            .as_any()
            .downcast_ref::<R>()
    }

    fn receive_spawned(
        &mut self,
        type_code: TypeCode,
        identity: NetworkIdentity,
        owner: EndpointId,
        handle: Option<SpawnHandle>,
        state: &[u8],
    ) -> Result<(), ReplicationError> {
        if self.directory.contains(&identity) {
            debug!("{} already spawned, ignoring", identity);
            return Ok(());
        }

        if let Some(handle) = handle.filter(|_| Some(owner) == self.endpoint()) {
            if let Some(pending) = self.pending_spawns.take(&handle) {
                let object = ReplicatedObject::new(identity, owner, pending.type_code, pending.replica);
                self.directory.insert(object)?;
                info!("spawn {:?} bound to {}", handle, identity);
                self.incoming_events.push_spawn_binding(handle, identity);
                return Ok(());
            }
        }

        let replica = self.registry.create(type_code, state)?;
        self.directory
            .insert(ReplicatedObject::new(identity, owner, type_code, replica))?;
        self.incoming_events.push_spawn(identity, owner);
        Ok(())
    }

    // Updates

    /// Sends the current state of one channel of an object this Client owns,
    /// returning the version it was sent with
    pub fn send_update(
        &mut self,
        identity: &NetworkIdentity,
        channel: ChannelIndex,
    ) -> Result<Version, ReplicantClientError> {
        self.check_running()?;
        self.check_owner(identity)?;
        let object = self
            .directory
            .get_mut(identity)
            .ok_or(ReplicationError::ObjectNotFound {
                identity: *identity,
            })?;
        let (version, payload) = object.write_update(channel)?;

        self.send(
            &ReplicationMessage::Update {
                identity: *identity,
                channel,
                version,
                payload,
            },
            self.update_delivery,
        );
        Ok(version)
    }

    // Despawning

    /// Asks the authority to despawn an object this Client owns. The object
    /// stays until the authority confirms.
    pub fn despawn(&mut self, identity: &NetworkIdentity) -> Result<(), ReplicantClientError> {
        self.check_running()?;
        self.check_owner(identity)?;
        self.send(
            &ReplicationMessage::DespawnRequest {
                identity: *identity,
            },
            self.lifecycle_delivery,
        );
        Ok(())
    }

    // World traffic

    /// Applies a Spawned, Update or Despawned message. Failures are logged
    /// and dropped.
    pub(super) fn apply_world_message(&mut self, message: ReplicationMessage) {
        let result = match message {
            ReplicationMessage::Spawned {
                type_code,
                identity,
                owner,
                handle,
                state,
            } => self.receive_spawned(type_code, identity, owner, handle, &state),
            ReplicationMessage::Update {
                identity,
                channel,
                version,
                payload,
            } => self
                .directory
                .apply_update(&identity, channel, version, &payload)
                .map(|()| self.incoming_events.push_update(identity, channel)),
            ReplicationMessage::Despawned { identity } => {
                match self.directory.despawn(&identity) {
                    Some(object) => self
                        .incoming_events
                        .push_despawn(identity, object.into_replica()),
                    None => debug!("{} already despawned", identity),
                }
                Ok(())
            }
            other => {
                warn!(
                    "Client Error: {} is not world traffic",
                    other.kind().name()
                );
                Ok(())
            }
        };

        if let Err(error) = result {
            error.log_dropped(EndpointId::AUTHORITY);
        }
    }

    // Access

    pub fn replica<R: ReplicaType>(&self, identity: &NetworkIdentity) -> Option<&R> {
        self.directory.replica::<R>(identity)
    }

    /// Mutable access to an object this Client owns. Call `send_update` to
    /// propagate the change.
    pub fn replica_mut<R: ReplicaType>(
        &mut self,
        identity: &NetworkIdentity,
    ) -> Result<&mut R, ReplicantClientError> {
        self.check_owner(identity)?;
        self.directory
            .get_mut(identity)
            .and_then(|object| object.downcast_mut::<R>())
            .ok_or(ReplicantClientError::Replication(
                ReplicationError::ObjectNotFound {
                    identity: *identity,
                },
            ))
    }

    fn check_owner(&self, identity: &NetworkIdentity) -> Result<(), ReplicationError> {
        let requester = self.endpoint().ok_or(ReplicationError::NotConnected)?;
        let owner = self
            .directory
            .get(identity)
            .ok_or(ReplicationError::ObjectNotFound {
                identity: *identity,
            })?
            .owner();
        if owner != requester {
            return Err(ReplicationError::NotOwner {
                identity: *identity,
                requester,
                owner,
            });
        }
        Ok(())
    }

    fn check_running(&self) -> Result<(), ReplicationError> {
        if self.session_ended {
            return Err(ReplicationError::SessionHalted);
        }
        Ok(())
    }
}
