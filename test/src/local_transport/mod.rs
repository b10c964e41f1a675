/// In-memory transport for E2E testing
/// Routes messages between the server and its clients without network I/O

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use log::trace;

use replicant_server::Transport as ServerTransport;
use replicant_client::Transport as ClientTransport;
use replicant_shared::{
    DeliveryMode, EndpointId, IngestSender, ReplicationMessage, ReplicationMessageKind, SendError,
};

/// One message the hub carried, decoded for inspection
#[derive(Debug, Clone)]
pub struct Delivery {
    pub from: EndpointId,
    pub to: EndpointId,
    pub message: ReplicationMessage,
}

struct HubState {
    server: IngestSender,
    clients: BTreeMap<EndpointId, IngestSender>,
    next_endpoint: u64,
    deliveries: Vec<Delivery>,
}

impl HubState {
    fn record(&mut self, from: EndpointId, to: EndpointId, payload: &[u8]) {
        if let Ok(message) = ReplicationMessage::from_bytes(payload) {
            trace!("{} -> {}: {}", from, to, message.kind().name());
            self.deliveries.push(Delivery { from, to, message });
        }
    }
}

/// Shared switchboard between one server ingestion queue and any number of
/// client ingestion queues. Delivery is reliable and ordered.
#[derive(Clone)]
pub struct LocalHub {
    state: Arc<Mutex<HubState>>,
}

impl LocalHub {
    pub fn new(server: IngestSender) -> Self {
        Self {
            state: Arc::new(Mutex::new(HubState {
                server,
                clients: BTreeMap::new(),
                next_endpoint: 1,
                deliveries: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap()
    }

    pub fn server_transport(&self) -> Box<LocalServerTransport> {
        Box::new(LocalServerTransport { hub: self.clone() })
    }

    pub fn client_transport(&self, incoming: IngestSender) -> Box<LocalClientTransport> {
        Box::new(LocalClientTransport {
            hub: self.clone(),
            incoming,
            endpoint: None,
        })
    }

    /// Simulates the link to `endpoint` dropping: both sides see a disconnect
    pub fn drop_client(&self, endpoint: EndpointId) {
        let mut state = self.lock();
        if let Some(client) = state.clients.remove(&endpoint) {
            client.disconnected(EndpointId::AUTHORITY).unwrap();
            state.server.disconnected(endpoint).unwrap();
        }
    }

    /// Pushes a message to the server as if `from` had sent it
    pub fn inject(&self, from: EndpointId, message: &ReplicationMessage) {
        self.inject_bytes(from, message.to_bytes());
    }

    pub fn inject_bytes(&self, from: EndpointId, bytes: Vec<u8>) {
        self.lock().server.message(from, bytes).unwrap();
    }

    /// Pushes a message to a client as if the server had sent it
    pub fn inject_to_client(&self, to: EndpointId, message: &ReplicationMessage) {
        let state = self.lock();
        if let Some(client) = state.clients.get(&to) {
            client
                .message(EndpointId::AUTHORITY, message.to_bytes())
                .unwrap();
        }
    }

    pub fn is_linked(&self, endpoint: EndpointId) -> bool {
        self.lock().clients.contains_key(&endpoint)
    }

    /// Every message delivered so far, in delivery order
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.lock().deliveries.clone()
    }

    /// Kinds of the messages delivered to `endpoint`, in delivery order
    pub fn kinds_delivered_to(&self, endpoint: EndpointId) -> Vec<ReplicationMessageKind> {
        self.lock()
            .deliveries
            .iter()
            .filter(|delivery| delivery.to == endpoint)
            .map(|delivery| delivery.message.kind())
            .collect()
    }

    pub fn clear_deliveries(&self) {
        self.lock().deliveries.clear();
    }
}

// Server side

pub struct LocalServerTransport {
    hub: LocalHub,
}

impl ServerTransport for LocalServerTransport {
    fn send(
        &mut self,
        endpoint: EndpointId,
        payload: &[u8],
        _mode: DeliveryMode,
    ) -> Result<(), SendError> {
        let mut state = self.hub.lock();
        let Some(client) = state.clients.get(&endpoint) else {
            return Err(SendError::NotConnected { endpoint });
        };
        client
            .message(EndpointId::AUTHORITY, payload.to_vec())
            .map_err(|error| SendError::Io {
                reason: error.to_string(),
            })?;
        state.record(EndpointId::AUTHORITY, endpoint, payload);
        Ok(())
    }

    fn disconnect(&mut self, endpoint: EndpointId) {
        let mut state = self.hub.lock();
        if let Some(client) = state.clients.remove(&endpoint) {
            let _ = client.disconnected(EndpointId::AUTHORITY);
        }
    }
}

// Client side

pub struct LocalClientTransport {
    hub: LocalHub,
    incoming: IngestSender,
    endpoint: Option<EndpointId>,
}

impl LocalClientTransport {
    pub fn endpoint(&self) -> Option<EndpointId> {
        self.endpoint
    }
}

impl ClientTransport for LocalClientTransport {
    fn connect(&mut self) -> Result<(), SendError> {
        let mut state = self.hub.lock();
        let endpoint = EndpointId::new(state.next_endpoint);
        state.next_endpoint += 1;
        state.clients.insert(endpoint, self.incoming.clone());
        self.endpoint = Some(endpoint);

        let unreachable = |_| SendError::Io {
            reason: "ingestion queue closed".to_string(),
        };
        self.incoming
            .connected(EndpointId::AUTHORITY)
            .map_err(unreachable)?;
        state.server.connected(endpoint).map_err(unreachable)?;
        Ok(())
    }

    fn send(&mut self, payload: &[u8], _mode: DeliveryMode) -> Result<(), SendError> {
        let endpoint = self.endpoint.ok_or(SendError::NotConnected {
            endpoint: EndpointId::AUTHORITY,
        })?;
        let mut state = self.hub.lock();
        if !state.clients.contains_key(&endpoint) {
            return Err(SendError::NotConnected {
                endpoint: EndpointId::AUTHORITY,
            });
        }
        state
            .server
            .message(endpoint, payload.to_vec())
            .map_err(|error| SendError::Io {
                reason: error.to_string(),
            })?;
        state.record(endpoint, EndpointId::AUTHORITY, payload);
        Ok(())
    }

    fn disconnect(&mut self) {
        let Some(endpoint) = self.endpoint.take() else {
            return;
        };
        let mut state = self.hub.lock();
        if state.clients.remove(&endpoint).is_some() {
            let _ = state.server.disconnected(endpoint);
        }
    }
}
