use replicant_shared::{DeliveryMode, EndpointId, SendError};

/// Outbound half of the link between the Server and its endpoints. Inbound
/// traffic arrives through the `IngestSender` handed to the transport.
pub trait Transport: Send {
    fn send(
        &mut self,
        endpoint: EndpointId,
        payload: &[u8],
        mode: DeliveryMode,
    ) -> Result<(), SendError>;

    fn disconnect(&mut self, endpoint: EndpointId);
}
