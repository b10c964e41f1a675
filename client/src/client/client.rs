use std::mem;

use log::{debug, info, warn};

use replicant_shared::{
    DeliveryMode, Directory, EndpointId, IngestReceiver, Protocol, ReplicationMessage, SyncState,
    SyncStatus, TransportEvent, TypeRegistry,
};

use crate::{
    events::ClientEvents, transport::Transport, world::PendingSpawns, ClientConfig,
    ReplicantClientError,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum ConnectionState {
    Disconnected,
    /// Transport asked to connect
    Connecting,
    /// Hello sent, waiting for Welcome or Rejected
    Handshaking,
    Connected(EndpointId),
}

/// A session participant. Owns the objects it spawns and mirrors every other
/// object in the session as a read-only proxy.
pub struct Client {
    pub(super) config: ClientConfig,
    pub(super) registry: TypeRegistry,
    pub(super) update_delivery: DeliveryMode,
    pub(super) lifecycle_delivery: DeliveryMode,
    transport: Option<Box<dyn Transport>>,
    incoming: IngestReceiver,
    pub(super) connection: ConnectionState,
    pub(super) directory: Directory,
    pub(super) pending_spawns: PendingSpawns,
    pub(super) sync: SyncState<ReplicationMessage>,
    pub(super) join_retries: u8,
    pub(super) session_ended: bool,
    pub(super) incoming_events: ClientEvents,
}

impl Client {
    /// Create a new Client reading transport events from `incoming`
    pub fn new<P: Into<Protocol>>(
        client_config: ClientConfig,
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
            config: client_config,
            registry: type_registry,
            update_delivery,
            lifecycle_delivery,
            transport: None,
            incoming,
            connection: ConnectionState::Disconnected,
            directory: Directory::new(),
            pending_spawns: PendingSpawns::new(),
            sync: SyncState::new(),
            join_retries: 0,
            session_ended: false,
            incoming_events: ClientEvents::new(),
        }
    }

    /// Connect to the authority through `transport`
    pub fn connect(&mut self, mut transport: Box<dyn Transport>) {
        if self.connection != ConnectionState::Disconnected {
            warn!("Client Error: Client is already connecting or connected");
            return;
        }
        if let Err(error) = transport.connect() {
            warn!("Client Error: transport could not connect: {}", error);
            self.incoming_events.push_error(error.into());
            return;
        }
        self.transport = Some(transport);
        self.connection = ConnectionState::Connecting;
    }

    /// Disconnects from the authority. Every local object is finalized.
    pub fn disconnect(&mut self) {
        if let Some(transport) = self.transport.as_mut() {
            transport.disconnect();
        }
        self.on_transport_disconnected();
    }

    /// Must be called regularly. Processes every transport event queued at
    /// the time of the call, in arrival order, and returns what happened.
    pub fn receive(&mut self) -> ClientEvents {
        for event in self.incoming.drain_pending() {
            match event {
                TransportEvent::Connected(_) => self.on_transport_connected(),
                TransportEvent::Disconnected(_) => self.on_transport_disconnected(),
                TransportEvent::Message(_, bytes) => self.on_message(&bytes),
            }
        }

        mem::replace(&mut self.incoming_events, ClientEvents::new())
    }

    /// Returns whether transport events are waiting to be processed
    pub fn has_pending_events(&self) -> bool {
        !self.incoming.is_empty()
    }

    // Connection

    fn on_transport_connected(&mut self) {
        if self.connection != ConnectionState::Connecting {
            debug!("ignoring transport connect in state {:?}", self.connection);
            return;
        }
        self.connection = ConnectionState::Handshaking;
        let type_names = self.registry.names();
        self.send(
            &ReplicationMessage::Hello { type_names },
            self.lifecycle_delivery,
        );
    }

    fn on_transport_disconnected(&mut self) {
        let previous = mem::replace(&mut self.connection, ConnectionState::Disconnected);
        match previous {
            ConnectionState::Disconnected => {
                debug!("transport disconnected while already disconnected");
                return;
            }
            ConnectionState::Connecting | ConnectionState::Handshaking => {
                self.incoming_events.push_connection_failure(
                    "connection closed before the authority accepted it".to_string(),
                );
            }
            ConnectionState::Connected(endpoint) => {
                info!("{} disconnected from the authority", endpoint);
                self.incoming_events.push_disconnection(endpoint);
            }
        }

        self.transport = None;
        for object in self.directory.clear() {
            let identity = object.identity();
            self.incoming_events
                .push_despawn(identity, object.into_replica());
        }
        self.pending_spawns.clear();
        self.sync.reset();
        self.join_retries = 0;
    }

    fn on_welcome(&mut self, endpoint: EndpointId) {
        if self.connection != ConnectionState::Handshaking {
            warn!("Client Error: unexpected Welcome in state {:?}", self.connection);
            return;
        }
        info!("accepted by the authority as {}", endpoint);
        self.connection = ConnectionState::Connected(endpoint);
        self.sync.await_snapshot();
        self.incoming_events.push_connection(endpoint);
    }

    fn on_rejected(&mut self, reason: String) {
        warn!("Client Error: connection rejected: {}", reason);
        if let Some(transport) = self.transport.as_mut() {
            transport.disconnect();
        }
        self.transport = None;
        self.connection = ConnectionState::Disconnected;
        self.sync.reset();
        self.incoming_events.push_connection_failure(reason);
    }

    // Messages

    fn on_message(&mut self, bytes: &[u8]) {
        if self.connection == ConnectionState::Disconnected {
            debug!("dropping message received while disconnected");
            return;
        }

        let message = match ReplicationMessage::from_bytes(bytes) {
            Ok(message) => message,
            Err(error) => {
                warn!("Client Error: cannot read malformed message: {}", error);
                self.incoming_events
                    .push_error(ReplicantClientError::MalformedMessage(error));
                return;
            }
        };

        if message.is_world_traffic() {
            if self.sync.is_idle() {
                self.apply_world_message(message);
            } else {
                self.sync.defer(message);
            }
            return;
        }

        match message {
            ReplicationMessage::Welcome { endpoint } => self.on_welcome(endpoint),
            ReplicationMessage::Rejected { reason } => self.on_rejected(reason),
            ReplicationMessage::SnapshotRequest { target } => self.on_snapshot_request(target),
            ReplicationMessage::SnapshotCount { count } => self.on_snapshot_count(count),
            ReplicationMessage::SnapshotEntry(entry) => self.on_snapshot_entry(entry),
            ReplicationMessage::SnapshotAbort => self.on_snapshot_abort(),
            ReplicationMessage::SessionEnded => {
                warn!("the authority ended the session");
                self.session_ended = true;
                self.incoming_events.push_session_ended();
            }
            other => {
                warn!(
                    "Client Error: authority sent {}, which only participants send",
                    other.kind().name()
                );
            }
        }
    }

    pub(super) fn send(&mut self, message: &ReplicationMessage, mode: DeliveryMode) {
        let Some(transport) = self.transport.as_mut() else {
            debug!("no transport, dropping {}", message.kind().name());
            return;
        };
        if let Err(error) = transport.send(&message.to_bytes(), mode) {
            warn!(
                "Client Error: cannot send {}: {}",
                message.kind().name(),
                error
            );
            self.incoming_events.push_error(error.into());
        }
    }

    // Queries

    /// The id the authority assigned this Client, once accepted
    pub fn endpoint(&self) -> Option<EndpointId> {
        match self.connection {
            ConnectionState::Connected(endpoint) => Some(endpoint),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.endpoint().is_some()
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync.status()
    }

    /// Connected and caught up with the session
    pub fn is_synced(&self) -> bool {
        self.is_connected() && self.sync.is_idle()
    }

    /// Returns whether the authority announced the end of the session
    pub fn is_session_ended(&self) -> bool {
        self.session_ended
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }
}
