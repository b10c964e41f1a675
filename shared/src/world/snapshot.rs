use replicant_serde::{BitReader, BitWrite, Serde, SerdeErr};

use crate::types::{ChannelIndex, EndpointId, NetworkIdentity, TypeCode, Version};

/// One live object as captured for a joining participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub type_code: TypeCode,
    pub identity: NetworkIdentity,
    pub owner: EndpointId,
    pub versions: Vec<(ChannelIndex, Version)>,
    pub state: Vec<u8>,
}

impl Serde for SnapshotEntry {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.type_code.ser(writer);
        self.identity.ser(writer);
        self.owner.ser(writer);
        self.versions.ser(writer);
        self.state.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            type_code: TypeCode::de(reader)?,
            identity: NetworkIdentity::de(reader)?,
            owner: EndpointId::de(reader)?,
            versions: Vec::de(reader)?,
            state: Vec::de(reader)?,
        })
    }
}
