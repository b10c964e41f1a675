mod delivery_mode;
mod error;
mod replication_message;

pub use delivery_mode::DeliveryMode;
pub use error::MessageError;
pub use replication_message::{ReplicationMessage, ReplicationMessageKind};
