use thiserror::Error;

use crate::types::TypeCode;

/// Errors that can occur during type registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Type name registered twice
    #[error("Type '{type_name}' is already registered. Each replicated type must be added to the Protocol exactly once")]
    DuplicateType { type_name: &'static str },

    /// Type code space is exhausted
    #[error("Cannot register more than {max} replicated types")]
    TooManyTypes { max: usize },

    /// Rust type never added to the registry
    #[error("Type '{type_name}' is not registered with the Protocol. Must call `add_type()` during protocol initialization")]
    TypeNotRegistered { type_name: &'static str },

    /// Type code absent from the registry
    #[error("Type code {type_code} not found in registry. Both sides must register the same types in the same order")]
    UnknownTypeCode { type_code: TypeCode },

    /// Full state could not be decoded into a new instance
    #[error("Failed to construct '{type_name}' from its state bytes. The payload is malformed or truncated")]
    Decode { type_name: &'static str },
}

/// Errors raised by the late-join sync state machine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Snapshot count arrived outside of a join
    #[error("Received a snapshot count of {count} while not awaiting a snapshot")]
    UnexpectedCount { count: u32 },

    /// Snapshot entry arrived outside of an active sync
    #[error("Received a snapshot entry while no snapshot sync is in progress")]
    UnexpectedEntry,
}
