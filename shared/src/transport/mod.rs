mod error;
mod ingest;

pub use error::{IngestError, SendError};
pub use ingest::{ingest_channel, IngestReceiver, IngestSender, TransportEvent};
