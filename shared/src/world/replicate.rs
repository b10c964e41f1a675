use std::any::Any;

use replicant_serde::{BitReader, BitWrite, SerdeErr};

use crate::types::ChannelIndex;

/// A value whose state is mirrored from its owner to every other participant.
///
/// State is split into named channels. An update on one channel carries only
/// that channel's fields and is versioned independently of the others.
pub trait Replicate: Send + Sync + 'static {
    /// Registered name, shared by every participant
    fn type_name(&self) -> &'static str;

    /// Names of the channels this type's state is split into
    fn channels(&self) -> &'static [&'static str] {
        &["state"]
    }

    /// Writes the full state
    fn write(&self, writer: &mut dyn BitWrite);

    /// Overwrites the full state
    fn read_apply(&mut self, reader: &mut BitReader) -> Result<(), SerdeErr>;

    /// Writes the fields belonging to one channel
    fn write_channel(&self, _channel: ChannelIndex, writer: &mut dyn BitWrite) {
        self.write(writer);
    }

    /// Overwrites the fields belonging to one channel
    fn read_channel(
        &mut self,
        _channel: ChannelIndex,
        reader: &mut BitReader,
    ) -> Result<(), SerdeErr> {
        self.read_apply(reader)
    }

    /// Runs once when the object is despawned locally
    fn finalize(&mut self) {}

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A concrete `Replicate` type that the registry can construct from bytes
pub trait ReplicaType: Replicate + Sized {
    const NAME: &'static str;

    fn read(reader: &mut BitReader) -> Result<Self, SerdeErr>;
}

/// Constructs a fresh instance of a registered type from its full state
pub trait ReplicateBuilder: Send + Sync {
    fn name(&self) -> &'static str;
    fn build(&self, reader: &mut BitReader) -> Result<Box<dyn Replicate>, SerdeErr>;
}

pub(crate) struct FnBuilder<F> {
    name: &'static str,
    factory: F,
}

impl<F> FnBuilder<F> {
    pub(crate) fn new(name: &'static str, factory: F) -> Self {
        Self { name, factory }
    }
}

impl<F> ReplicateBuilder for FnBuilder<F>
where
    F: Fn(&mut BitReader) -> Result<Box<dyn Replicate>, SerdeErr> + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn build(&self, reader: &mut BitReader) -> Result<Box<dyn Replicate>, SerdeErr> {
        (self.factory)(reader)
    }
}
