/// Guarantees a transport is asked to provide for one send
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum DeliveryMode {
    /// May be lost or reordered
    UnorderedUnreliable,
    /// May be lost; late arrivals are discarded by the transport
    SequencedUnreliable,
    /// Always arrives, in any order
    UnorderedReliable,
    /// Always arrives, in send order
    OrderedReliable,
}
