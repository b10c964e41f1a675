use thiserror::Error;

use replicant_shared::{MessageError, ReplicationError, SendError};

/// Errors surfaced to the application by the Client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicantClientError {
    /// A replication call or message could not be applied
    #[error(transparent)]
    Replication(#[from] ReplicationError),

    /// The transport refused to deliver a message
    #[error("Client Error: transport send failed: {0}")]
    Send(#[from] SendError),

    /// The authority sent bytes that do not decode as a message
    #[error("Client Error: malformed message from the authority: {0}")]
    MalformedMessage(MessageError),
}
