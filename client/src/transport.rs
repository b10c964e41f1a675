use replicant_shared::{DeliveryMode, SendError};

/// Outbound half of the link to the authority. Inbound traffic arrives
/// through the `IngestSender` handed to the transport.
pub trait Transport: Send {
    /// Begins connecting. Completion is reported as a `Connected` event.
    fn connect(&mut self) -> Result<(), SendError>;

    fn send(&mut self, payload: &[u8], mode: DeliveryMode) -> Result<(), SendError>;

    fn disconnect(&mut self);
}
