/// Minimal test protocol for E2E testing

use std::any::Any;

use replicant_shared::{
    BitReader, BitWrite, ChannelIndex, Protocol, ReplicaType, Replicate, Serde, SerdeErr,
};

pub const MOTION: ChannelIndex = 0;
pub const LABEL: ChannelIndex = 1;

/// Two independently versioned channels: coordinates and a label
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub label: String,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            label: String::new(),
        }
    }
}

impl Replicate for Position {
    fn type_name(&self) -> &'static str {
        Self::NAME
    }

    fn channels(&self) -> &'static [&'static str] {
        &["motion", "label"]
    }

    fn write(&self, writer: &mut dyn BitWrite) {
        self.x.ser(writer);
        self.y.ser(writer);
        self.label.ser(writer);
    }

    fn read_apply(&mut self, reader: &mut BitReader) -> Result<(), SerdeErr> {
        self.x = f32::de(reader)?;
        self.y = f32::de(reader)?;
        self.label = String::de(reader)?;
        Ok(())
    }

    fn write_channel(&self, channel: ChannelIndex, writer: &mut dyn BitWrite) {
        match channel {
            MOTION => {
                self.x.ser(writer);
                self.y.ser(writer);
            }
            _ => self.label.ser(writer),
        }
    }

    fn read_channel(&mut self, channel: ChannelIndex, reader: &mut BitReader) -> Result<(), SerdeErr> {
        match channel {
            MOTION => {
                self.x = f32::de(reader)?;
                self.y = f32::de(reader)?;
            }
            _ => self.label = String::de(reader)?,
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl ReplicaType for Position {
    const NAME: &'static str = "Position";

    fn read(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            x: f32::de(reader)?,
            y: f32::de(reader)?,
            label: String::de(reader)?,
        })
    }
}

/// Single channel. Records whether, and how often, its finalizer ran.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub value: u32,
    pub finalized: bool,
    pub finalize_count: u32,
}

impl Marker {
    pub fn new(value: u32) -> Self {
        Self {
            value,
            finalized: false,
            finalize_count: 0,
        }
    }
}

impl Replicate for Marker {
    fn type_name(&self) -> &'static str {
        Self::NAME
    }

    fn write(&self, writer: &mut dyn BitWrite) {
        self.value.ser(writer);
    }

    fn read_apply(&mut self, reader: &mut BitReader) -> Result<(), SerdeErr> {
        self.value = u32::de(reader)?;
        Ok(())
    }

    fn finalize(&mut self) {
        self.finalized = true;
        self.finalize_count += 1;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl ReplicaType for Marker {
    const NAME: &'static str = "Marker";

    fn read(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self::new(u32::de(reader)?))
    }
}

pub fn protocol() -> Protocol {
    Protocol::builder()
        .add_type::<Position>()
        .add_type::<Marker>()
        .build()
}

/// Same types registered in the opposite order
pub fn reordered_protocol() -> Protocol {
    Protocol::builder()
        .add_type::<Marker>()
        .add_type::<Position>()
        .build()
}
