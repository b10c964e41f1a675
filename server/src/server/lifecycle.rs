use log::{debug, info, warn};

use replicant_shared::{
    ChannelIndex, EndpointId, NetworkIdentity, ReplicaType, Replicate, ReplicatedObject,
    ReplicationError, ReplicationMessage, SpawnHandle, TypeCode, Version,
};

use super::server::{EndpointState, Server};
use crate::ReplicantServerError;

impl Server {
    // Spawning

    /// Spawns an object owned by the Server and broadcasts it to every endpoint
    pub fn spawn<R: ReplicaType>(&mut self, replica: R) -> Result<NetworkIdentity, ReplicantServerError> {
        self.check_running()?;
        let type_code = self
            .registry
            .type_code_of::<R>()
            .map_err(ReplicationError::from)?;
        let identity = self.accept_spawn(type_code, EndpointId::AUTHORITY, None, Box::new(replica))?;
        Ok(identity)
    }

    pub(super) fn handle_spawn_request(
        &mut self,
        requester: EndpointId,
        handle: SpawnHandle,
        type_code: TypeCode,
        state: &[u8],
    ) -> Result<(), ReplicationError> {
        if let Some(identity) = self.spawn_handles.get(&(requester, handle)).copied() {
            debug!(
                "{} repeated spawn request {:?}, re-sending {}",
                requester, handle, identity
            );
            self.resend_spawned(requester, handle, &identity);
            return Ok(());
        }

        let replica = self.registry.create(type_code, state)?;
        self.accept_spawn(type_code, requester, Some(handle), replica)?;
        Ok(())
    }

    /// Allocates an identity, records ownership and broadcasts the spawn
    fn accept_spawn(
        &mut self,
        type_code: TypeCode,
        owner: EndpointId,
        handle: Option<SpawnHandle>,
        replica: Box<dyn Replicate>,
    ) -> Result<NetworkIdentity, ReplicationError> {
        let identity = self
            .allocator
            .generate()
            .ok_or(ReplicationError::IdentitiesExhausted)?;
        self.ownership.insert(identity, owner)?;

        let object = ReplicatedObject::new(identity, owner, type_code, replica);
        let state = object.state_bytes();
        if let Err(error) = self.directory.insert(object) {
            self.ownership.remove(&identity);
            return Err(error);
        }
        if let Some(handle) = handle {
            self.spawn_handles.insert((owner, handle), identity);
        }

        info!("spawned {} for {}", identity, owner);
        self.broadcast(
            &ReplicationMessage::Spawned {
                type_code,
                identity,
                owner,
                handle,
                state,
            },
            self.lifecycle_delivery,
            None,
        );
        self.incoming_events.push_spawn(identity, owner);
        Ok(identity)
    }

    fn resend_spawned(
        &mut self,
        requester: EndpointId,
        handle: SpawnHandle,
        identity: &NetworkIdentity,
    ) {
        let Some(object) = self.directory.get(identity) else {
            return;
        };
        let message = ReplicationMessage::Spawned {
            type_code: object.type_code(),
            identity: *identity,
            owner: object.owner(),
            handle: Some(handle),
            state: object.state_bytes(),
        };
        self.send_to(requester, &message, self.lifecycle_delivery);
    }

    // Updates

    /// Broadcasts the current state of one channel of a Server-owned object,
    /// returning the version it was sent with
    pub fn send_update(
        &mut self,
        identity: &NetworkIdentity,
        channel: ChannelIndex,
    ) -> Result<Version, ReplicantServerError> {
        self.check_running()?;
        self.ownership
            .check_owner(identity, EndpointId::AUTHORITY)?;
        let object = self
            .directory
            .get_mut(identity)
            .ok_or(ReplicationError::ObjectNotFound {
                identity: *identity,
            })?;
        let (version, payload) = object.write_update(channel)?;

        self.broadcast(
            &ReplicationMessage::Update {
                identity: *identity,
                channel,
                version,
                payload,
            },
            self.update_delivery,
            None,
        );
        Ok(version)
    }

    pub(super) fn handle_update(
        &mut self,
        sender: EndpointId,
        identity: NetworkIdentity,
        channel: ChannelIndex,
        version: Version,
        payload: Vec<u8>,
    ) -> Result<(), ReplicationError> {
        self.ownership.check_owner(&identity, sender)?;
        self.directory
            .apply_update(&identity, channel, version, &payload)?;

        self.broadcast(
            &ReplicationMessage::Update {
                identity,
                channel,
                version,
                payload,
            },
            self.update_delivery,
            Some(sender),
        );
        self.incoming_events.push_update(identity, channel);
        Ok(())
    }

    // Despawning

    /// Despawns a Server-owned object
    pub fn despawn(&mut self, identity: &NetworkIdentity) -> Result<(), ReplicantServerError> {
        self.check_running()?;
        self.despawn_as(identity, EndpointId::AUTHORITY)?;
        Ok(())
    }

    pub(super) fn despawn_as(
        &mut self,
        identity: &NetworkIdentity,
        requester: EndpointId,
    ) -> Result<(), ReplicationError> {
        self.ownership.check_owner(identity, requester)?;
        self.despawn_inner(identity, None);
        Ok(())
    }

    /// Removes an object everywhere. `except` is skipped by the broadcast.
    fn despawn_inner(&mut self, identity: &NetworkIdentity, except: Option<EndpointId>) {
        if self.ownership.remove(identity).is_none() {
            return;
        }
        self.spawn_handles.retain(|_, spawned| spawned != identity);

        info!("despawned {}", identity);
        self.broadcast(
            &ReplicationMessage::Despawned {
                identity: *identity,
            },
            self.lifecycle_delivery,
            except,
        );
        if let Some(object) = self.directory.despawn(identity) {
            self.incoming_events
                .push_despawn(*identity, object.into_replica());
        }
    }

    // Disconnects

    /// Despawns everything the endpoint owned, abandons joins waiting on it,
    /// and ends the session if it was the host
    pub(super) fn on_disconnected(&mut self, endpoint: EndpointId) {
        let Some(state) = self.endpoints.remove(&endpoint) else {
            debug!("{} disconnected, but was not connected", endpoint);
            return;
        };
        info!("{} disconnected", endpoint);
        if state == EndpointState::Handshaking {
            return;
        }

        for identity in self.ownership.owned_by(endpoint) {
            self.despawn_inner(&identity, Some(endpoint));
        }
        self.spawn_handles.retain(|(owner, _), _| *owner != endpoint);

        self.joins.cancel(endpoint);
        for target in self.joins.source_lost(endpoint) {
            ReplicationError::SnapshotSourceLost {
                snapshot_source: endpoint,
                target,
            }
            .log_dropped(endpoint);
            self.send_to(target, &ReplicationMessage::SnapshotAbort, self.lifecycle_delivery);
            self.incoming_events.push_join_abort(target);
        }

        self.incoming_events.push_disconnection(endpoint);

        if self.host == Some(endpoint) {
            self.halt(endpoint);
        }
    }

    fn halt(&mut self, host: EndpointId) {
        let error = ReplicationError::HostDisconnected { host };
        warn!("{}", error);

        self.broadcast(&ReplicationMessage::SessionEnded, self.lifecycle_delivery, None);
        for endpoint in self.endpoints() {
            self.disconnect_transport(endpoint);
        }
        self.endpoints.clear();
        self.halted = true;

        self.incoming_events.push_session_ended(host);
        self.incoming_events.push_error(error.into());
    }

    fn check_running(&self) -> Result<(), ReplicationError> {
        if self.halted {
            return Err(ReplicationError::SessionHalted);
        }
        Ok(())
    }
}
