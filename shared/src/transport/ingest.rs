use smol::channel::{self, Receiver, Sender, TryRecvError};

use crate::{transport::error::IngestError, types::EndpointId};

/// What a transport reports to the dispatch loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected(EndpointId),
    Disconnected(EndpointId),
    Message(EndpointId, Vec<u8>),
}

/// Creates the multi-producer ingestion queue feeding one dispatch loop.
/// The sender may be cloned into any number of transport threads.
pub fn ingest_channel() -> (IngestSender, IngestReceiver) {
    let (sender, receiver) = channel::unbounded();
    (IngestSender { sender }, IngestReceiver { receiver })
}

#[derive(Clone)]
pub struct IngestSender {
    sender: Sender<TransportEvent>,
}

impl IngestSender {
    pub fn push(&self, event: TransportEvent) -> Result<(), IngestError> {
        self.sender.try_send(event).map_err(|_| IngestError::Closed)
    }

    pub fn connected(&self, endpoint: EndpointId) -> Result<(), IngestError> {
        self.push(TransportEvent::Connected(endpoint))
    }

    pub fn disconnected(&self, endpoint: EndpointId) -> Result<(), IngestError> {
        self.push(TransportEvent::Disconnected(endpoint))
    }

    pub fn message(&self, from: EndpointId, bytes: Vec<u8>) -> Result<(), IngestError> {
        self.push(TransportEvent::Message(from, bytes))
    }
}

pub struct IngestReceiver {
    receiver: Receiver<TransportEvent>,
}

impl IngestReceiver {
    /// Takes every event queued at the time of the call. Events pushed while
    /// the returned batch is processed wait for the next call.
    pub fn drain_pending(&self) -> Vec<TransportEvent> {
        let pending = self.receiver.len();
        let mut output = Vec::with_capacity(pending);
        for _ in 0..pending {
            match self.receiver.try_recv() {
                Ok(event) => output.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        output
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
