use thiserror::Error;

use crate::types::EndpointId;

/// Errors a transport reports when asked to send or disconnect
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// Destination is not (or no longer) connected
    #[error("Cannot send to {endpoint}: it is not connected")]
    NotConnected { endpoint: EndpointId },

    /// Underlying link failed
    #[error("Transport failure: {reason}")]
    Io { reason: String },
}

/// Errors that can occur while pushing onto the ingestion queue
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// The receiving side was dropped
    #[error("Ingestion queue is closed. The server or client that owned it has been dropped")]
    Closed,
}
