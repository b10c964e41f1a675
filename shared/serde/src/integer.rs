use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, serde::Serde};

/// An unsigned integer written in `BITS`-wide groups, each preceded by a
/// continuation bit. Small values stay small on the wire.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct UnsignedVariableInteger<const BITS: u8> {
    value: u64,
}

impl<const BITS: u8> UnsignedVariableInteger<BITS> {
    pub fn new<T: Into<u64>>(value: T) -> Self {
        if BITS == 0 || BITS > 63 {
            panic!("variable integer group width must be between 1 and 63 bits");
        }
        Self {
            value: value.into(),
        }
    }

    pub fn get(&self) -> u64 {
        self.value
    }
}

impl<const BITS: u8> Serde for UnsignedVariableInteger<BITS> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let mut value = self.value;
        loop {
            let proceed = value >> BITS != 0;
            writer.write_bit(proceed);
            writer.write_bits(value, BITS);
            value >>= BITS;
            if !proceed {
                return;
            }
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let mut output: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let proceed = reader.read_bit()?;
            let group = reader.read_bits(BITS)?;
            if shift >= u64::BITS || (shift > 0 && group >> (u64::BITS - shift) != 0) {
                // more groups than a u64 can hold
                return Err(SerdeErr);
            }
            output |= group << shift;
            shift += BITS as u32;
            if !proceed {
                return Ok(Self { value: output });
            }
        }
    }
}

impl<const BITS: u8> From<u64> for UnsignedVariableInteger<BITS> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}
