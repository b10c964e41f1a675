use std::fmt;

use replicant_serde::{BitReader, BitWrite, Serde, SerdeErr, UnsignedVariableInteger};

/// Registry-assigned code for a replicated type, stable across a session
pub type TypeCode = u16;
/// Index of a channel within one replicated type's channel list
pub type ChannelIndex = u8;
/// Per-(object, channel) sequence number; higher is newer
pub type Version = u32;

/// Session-wide unique id of a replicated object. Allocated only by the
/// authority, strictly increasing, never reused.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NetworkIdentity(u64);

impl NetworkIdentity {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NetworkIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Serde for NetworkIdentity {
    fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedVariableInteger::<7>::new(self.0).ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self(UnsignedVariableInteger::<7>::de(reader)?.get()))
    }
}

/// A session participant. The authority is always `EndpointId::AUTHORITY`;
/// remote peers are numbered from 1 by their transport.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EndpointId(u64);

impl EndpointId {
    pub const AUTHORITY: EndpointId = EndpointId(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_authority(&self) -> bool {
        *self == Self::AUTHORITY
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_authority() {
            write!(f, "authority")
        } else {
            write!(f, "endpoint {}", self.0)
        }
    }
}

impl Serde for EndpointId {
    fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedVariableInteger::<7>::new(self.0).ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self(UnsignedVariableInteger::<7>::de(reader)?.get()))
    }
}

/// Correlates a participant's optimistic spawn with the authority's
/// confirmation. Only meaningful to the participant that minted it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SpawnHandle(u32);

impl SpawnHandle {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Serde for SpawnHandle {
    fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedVariableInteger::<7>::new(self.0).ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let value = UnsignedVariableInteger::<7>::de(reader)?.get();
        Ok(Self(u32::try_from(value).map_err(|_| SerdeErr)?))
    }
}

