use std::{collections::HashMap, mem};

use log::{debug, info, warn};

use replicant_shared::{
    DeliveryMode, Directory, EndpointId, IngestReceiver, NetworkIdentity, Protocol, ReplicaType,
    ReplicationError, ReplicationMessage, SpawnHandle, TransportEvent, TypeRegistry,
};

use crate::{
    events::ServerEvents,
    transport::Transport,
    world::{IdentityAllocator, JoinCoordinator, OwnershipTable},
    HostPolicy, ReplicantServerError, ServerConfig,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum EndpointState {
    /// Transport connected, waiting for the registry handshake
    Handshaking,
    Accepted,
}

/// The session authority. Allocates identities, enforces ownership, relays
/// replication traffic between endpoints and coordinates late joins.
///
/// All state is touched only from `receive` and the replication methods, so
/// a Server must be driven from a single thread. Transports push into its
/// ingestion queue from as many threads as they like.
pub struct Server {
    pub(super) config: ServerConfig,
    pub(super) registry: TypeRegistry,
    pub(super) update_delivery: DeliveryMode,
    pub(super) lifecycle_delivery: DeliveryMode,
    transport: Option<Box<dyn Transport>>,
    incoming: IngestReceiver,
    pub(super) endpoints: HashMap<EndpointId, EndpointState>,
    pub(super) host: Option<EndpointId>,
    pub(super) directory: Directory,
    pub(super) ownership: OwnershipTable,
    pub(super) allocator: IdentityAllocator,
    pub(super) spawn_handles: HashMap<(EndpointId, SpawnHandle), NetworkIdentity>,
    pub(super) joins: JoinCoordinator,
    pub(super) halted: bool,
    pub(super) incoming_events: ServerEvents,
}

impl Server {
    /// Create a new Server reading transport events from `incoming`
    pub fn new<P: Into<Protocol>>(
        server_config: ServerConfig,
        protocol: P,
        incoming: IngestReceiver,
    ) -> Self {
        let mut protocol: Protocol = protocol.into();
        if !protocol.is_locked() {
            protocol.lock();
        }

        let Protocol {
            type_registry,
            update_delivery,
            lifecycle_delivery,
            ..
        } = protocol;

        Self {
            config: server_config,
            registry: type_registry,
            update_delivery,
            lifecycle_delivery,
            transport: None,
            incoming,
            endpoints: HashMap::new(),
            host: None,
            directory: Directory::new(),
            ownership: OwnershipTable::new(),
            allocator: IdentityAllocator::new(),
            spawn_handles: HashMap::new(),
            joins: JoinCoordinator::new(),
            halted: false,
            incoming_events: ServerEvents::new(),
        }
    }

    /// Attach the transport used for all outbound traffic
    pub fn listen(&mut self, transport: Box<dyn Transport>) {
        self.transport = Some(transport);
    }

    /// Returns whether a transport has been attached
    pub fn is_listening(&self) -> bool {
        self.transport.is_some()
    }

    /// Must be called regularly. Processes every transport event queued at
    /// the time of the call, in arrival order, and returns what happened.
    pub fn receive(&mut self) -> ServerEvents {
        for event in self.incoming.drain_pending() {
            if self.halted {
                self.refuse_after_halt(event);
                continue;
            }
            match event {
                TransportEvent::Connected(endpoint) => self.on_connected(endpoint),
                TransportEvent::Disconnected(endpoint) => self.on_disconnected(endpoint),
                TransportEvent::Message(endpoint, bytes) => self.on_message(endpoint, &bytes),
            }
        }

        mem::replace(&mut self.incoming_events, ServerEvents::new())
    }

    /// Returns whether transport events are waiting to be processed
    pub fn has_pending_events(&self) -> bool {
        !self.incoming.is_empty()
    }

    // Connections

    fn on_connected(&mut self, endpoint: EndpointId) {
        if endpoint.is_authority() {
            warn!("Server Error: transport reported a connection from the authority id");
            return;
        }
        if self.endpoints.contains_key(&endpoint) {
            warn!("Server Error: {} connected twice", endpoint);
            return;
        }
        info!("{} connected, awaiting handshake", endpoint);
        self.endpoints.insert(endpoint, EndpointState::Handshaking);
    }

    /// A halted session turns away new connections and ignores everything else
    fn refuse_after_halt(&mut self, event: TransportEvent) {
        let TransportEvent::Connected(endpoint) = event else {
            debug!("session halted, ignoring transport event");
            return;
        };
        let reason = ReplicationError::SessionHalted.to_string();
        info!("refusing {}: {}", endpoint, reason);
        self.send_to(
            endpoint,
            &ReplicationMessage::Rejected {
                reason: reason.clone(),
            },
            self.lifecycle_delivery,
        );
        self.disconnect_transport(endpoint);
        self.incoming_events.push_rejection(endpoint, reason);
    }

    fn handle_hello(&mut self, endpoint: EndpointId, type_names: Vec<String>) {
        if self.endpoints.get(&endpoint) == Some(&EndpointState::Accepted) {
            warn!("Server Error: {} sent a second Hello", endpoint);
            return;
        }

        let expected = self.registry.names();
        if type_names != expected {
            let error = ReplicationError::RegistryMismatch {
                expected,
                received: type_names,
            };
            error.log_dropped(endpoint);
            let reason = error.to_string();
            self.send_to(
                endpoint,
                &ReplicationMessage::Rejected {
                    reason: reason.clone(),
                },
                self.lifecycle_delivery,
            );
            self.disconnect_transport(endpoint);
            self.endpoints.remove(&endpoint);
            self.incoming_events.push_rejection(endpoint, reason);
            return;
        }

        self.endpoints.insert(endpoint, EndpointState::Accepted);
        self.send_to(
            endpoint,
            &ReplicationMessage::Welcome { endpoint },
            self.lifecycle_delivery,
        );
        if self.config.host_policy == HostPolicy::FirstConnected && self.host.is_none() {
            info!("{} is the session host", endpoint);
            self.host = Some(endpoint);
        }
        info!("{} accepted", endpoint);
        self.incoming_events.push_connection(endpoint);

        self.begin_join(endpoint);
    }

    /// Disconnects an endpoint as if its transport had dropped
    pub fn disconnect(&mut self, endpoint: EndpointId) {
        self.disconnect_transport(endpoint);
        self.on_disconnected(endpoint);
    }

    pub(super) fn disconnect_transport(&mut self, endpoint: EndpointId) {
        if let Some(transport) = self.transport.as_mut() {
            transport.disconnect(endpoint);
        }
    }

    pub(super) fn is_accepted(&self, endpoint: &EndpointId) -> bool {
        self.endpoints.get(endpoint) == Some(&EndpointState::Accepted)
    }

    // Messages

    fn on_message(&mut self, endpoint: EndpointId, bytes: &[u8]) {
        let Some(state) = self.endpoints.get(&endpoint).copied() else {
            warn!("Server Error: message from unknown {}", endpoint);
            return;
        };

        let message = match ReplicationMessage::from_bytes(bytes) {
            Ok(message) => message,
            Err(error) => {
                warn!("Server Error: cannot read malformed message from {}: {}", endpoint, error);
                self.incoming_events
                    .push_error(ReplicantServerError::MalformedMessage { endpoint, error });
                return;
            }
        };

        if state == EndpointState::Handshaking {
            let kind = message.kind();
            let ReplicationMessage::Hello { type_names } = message else {
                warn!(
                    "Server Error: {} sent {} before its handshake",
                    endpoint,
                    kind.name()
                );
                return;
            };
            self.handle_hello(endpoint, type_names);
            return;
        }

        let result = match message {
            ReplicationMessage::Hello { type_names } => {
                self.handle_hello(endpoint, type_names);
                Ok(())
            }
            ReplicationMessage::SpawnRequest {
                handle,
                type_code,
                state,
            } => self.handle_spawn_request(endpoint, handle, type_code, &state),
            ReplicationMessage::Update {
                identity,
                channel,
                version,
                payload,
            } => self.handle_update(endpoint, identity, channel, version, payload),
            ReplicationMessage::DespawnRequest { identity } => {
                self.despawn_as(&identity, endpoint)
            }
            ReplicationMessage::SnapshotReply { target, entries } => {
                self.handle_snapshot_reply(endpoint, target, entries);
                Ok(())
            }
            ReplicationMessage::JoinRetry => {
                self.handle_join_retry(endpoint);
                Ok(())
            }
            other => {
                warn!(
                    "Server Error: {} sent {}, which only the authority sends",
                    endpoint,
                    other.kind().name()
                );
                Ok(())
            }
        };

        if let Err(error) = result {
            error.log_dropped(endpoint);
        }
    }

    pub(super) fn send_to(
        &mut self,
        endpoint: EndpointId,
        message: &ReplicationMessage,
        mode: DeliveryMode,
    ) {
        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        if let Err(error) = transport.send(endpoint, &message.to_bytes(), mode) {
            warn!(
                "Server Error: cannot send {} to {}: {}",
                message.kind().name(),
                endpoint,
                error
            );
            self.incoming_events.push_error(error.into());
        }
    }

    /// Sends to every accepted endpoint except `except`, ascending
    pub(super) fn broadcast(
        &mut self,
        message: &ReplicationMessage,
        mode: DeliveryMode,
        except: Option<EndpointId>,
    ) {
        if self.transport.is_none() {
            return;
        }
        let payload = message.to_bytes();
        for endpoint in self.endpoints() {
            if Some(endpoint) == except {
                continue;
            }
            let Some(transport) = self.transport.as_mut() else {
                return;
            };
            if let Err(error) = transport.send(endpoint, &payload, mode) {
                warn!(
                    "Server Error: cannot send {} to {}: {}",
                    message.kind().name(),
                    endpoint,
                    error
                );
                self.incoming_events.push_error(error.into());
            }
        }
    }

    // Queries

    /// Accepted endpoints, ascending
    pub fn endpoints(&self) -> Vec<EndpointId> {
        let mut output: Vec<EndpointId> = self
            .endpoints
            .iter()
            .filter(|(_, state)| **state == EndpointState::Accepted)
            .map(|(endpoint, _)| *endpoint)
            .collect();
        output.sort_unstable();
        output
    }

    pub fn host(&self) -> Option<EndpointId> {
        self.host
    }

    /// Returns whether the session ended because its host left
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn owner_of(&self, identity: &NetworkIdentity) -> Option<EndpointId> {
        self.ownership.owner(identity)
    }

    /// Number of live objects
    pub fn object_count(&self) -> usize {
        self.ownership.len()
    }

    /// The endpoint asked to supply a snapshot for `target`, while its join
    /// is waiting on one
    pub fn pending_join_source(&self, target: &EndpointId) -> Option<EndpointId> {
        self.joins.source_of(target)
    }

    pub fn replica<R: ReplicaType>(&self, identity: &NetworkIdentity) -> Option<&R> {
        self.directory.replica::<R>(identity)
    }

    /// Mutable access to an object the Server itself owns
    pub fn replica_mut<R: ReplicaType>(
        &mut self,
        identity: &NetworkIdentity,
    ) -> Result<&mut R, ReplicantServerError> {
        self.ownership
            .check_owner(identity, EndpointId::AUTHORITY)?;
        self.directory
            .get_mut(identity)
            .and_then(|object| object.downcast_mut::<R>())
            .ok_or(ReplicantServerError::Replication(
                ReplicationError::ObjectNotFound {
                    identity: *identity,
                },
            ))
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }
}
