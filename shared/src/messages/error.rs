use thiserror::Error;

/// Errors that can occur while decoding a wire message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// Leading tag byte names no known message
    #[error("Unknown message tag {tag}. The peer may be running an incompatible protocol version")]
    UnknownTag { tag: u8 },

    /// Body ended early or held invalid values
    #[error("Malformed {kind} message. The payload is truncated or corrupt")]
    Malformed { kind: &'static str },

    /// Bytes left over after a complete message
    #[error("{kind} message has {bits} trailing bits")]
    TrailingBytes { kind: &'static str, bits: usize },

    /// Empty datagram
    #[error("Received an empty message")]
    Empty,
}
