use thiserror::Error;

use replicant_shared::{EndpointId, MessageError, ReplicationError, SendError};

/// Errors surfaced to the application by the Server
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicantServerError {
    /// A replication call or message could not be applied
    #[error(transparent)]
    Replication(#[from] ReplicationError),

    /// A transport refused to deliver a message
    #[error("Server Error: transport send failed: {0}")]
    Send(#[from] SendError),

    /// A late join could not be served
    #[error("Server Error: {0}")]
    Join(#[from] JoinError),

    /// An endpoint sent bytes that do not decode as a message
    #[error("Server Error: malformed message from {endpoint}: {error}")]
    MalformedMessage {
        endpoint: EndpointId,
        error: MessageError,
    },
}

/// Errors raised by the join coordinator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// Reply for a join that is not waiting on a snapshot
    #[error("Snapshot reply for {target} does not match any pending join")]
    UnknownJoin { target: EndpointId },

    /// Reply from an endpoint other than the chosen source
    #[error("Snapshot reply for {target} came from {from}, but {expected} was asked")]
    WrongSource {
        target: EndpointId,
        from: EndpointId,
        expected: EndpointId,
    },

    /// More entries than a snapshot count can carry
    #[error("Snapshot for {target} holds {entries} entries, more than a count can announce")]
    SnapshotTooLarge { target: EndpointId, entries: usize },
}
