use thiserror::Error;

/// Failure to decode a value from a bit stream
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
#[error("malformed or truncated bit stream")]
pub struct SerdeErr;
