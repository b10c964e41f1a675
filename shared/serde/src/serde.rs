use crate::{
    bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr,
    integer::UnsignedVariableInteger,
};

/// A type that can be written to and read back from a bit stream
pub trait Serde: Sized + Clone + PartialEq {
    fn ser(&self, writer: &mut dyn BitWrite);
    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr>;
}

// Unit

impl Serde for () {
    fn ser(&self, _: &mut dyn BitWrite) {}

    fn de(_: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(())
    }
}

// Boolean

impl Serde for bool {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_bit()
    }
}

// Fixed-width numbers, little endian

macro_rules! impl_serde_number {
    ($impl_type:ident) => {
        impl Serde for $impl_type {
            fn ser(&self, writer: &mut dyn BitWrite) {
                writer.write_bytes(&self.to_le_bytes());
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                let mut bytes = [0u8; std::mem::size_of::<$impl_type>()];
                for byte in bytes.iter_mut() {
                    *byte = reader.read_byte()?;
                }
                Ok($impl_type::from_le_bytes(bytes))
            }
        }
    };
}

impl_serde_number!(u8);
impl_serde_number!(u16);
impl_serde_number!(u32);
impl_serde_number!(u64);
impl_serde_number!(i8);
impl_serde_number!(i16);
impl_serde_number!(i32);
impl_serde_number!(i64);
impl_serde_number!(f32);
impl_serde_number!(f64);

// Lengths

fn ser_length(length: usize, writer: &mut dyn BitWrite) {
    UnsignedVariableInteger::<7>::new(length as u64).ser(writer);
}

/// Reads a collection length. A length that cannot fit in the remaining
/// bits is rejected before anything is allocated.
fn de_length(reader: &mut BitReader, min_item_bits: usize) -> Result<usize, SerdeErr> {
    let length = UnsignedVariableInteger::<7>::de(reader)?.get();
    let length = usize::try_from(length).map_err(|_| SerdeErr)?;
    if length.saturating_mul(min_item_bits.max(1)) > reader.bits_remaining() {
        return Err(SerdeErr);
    }
    Ok(length)
}

// String

impl Serde for String {
    fn ser(&self, writer: &mut dyn BitWrite) {
        ser_length(self.len(), writer);
        writer.write_bytes(self.as_bytes());
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = de_length(reader, 8)?;
        let bytes = reader.read_bytes(length)?;
        String::from_utf8(bytes).map_err(|_| SerdeErr)
    }
}

// Option

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        match self {
            Some(value) => {
                writer.write_bit(true);
                value.ser(writer);
            }
            None => writer.write_bit(false),
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if reader.read_bit()? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }
}

// Vec

impl<T: Serde> Serde for Vec<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        ser_length(self.len(), writer);
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = de_length(reader, 1)?;
        let mut output = Vec::with_capacity(length);
        for _ in 0..length {
            output.push(T::de(reader)?);
        }
        Ok(output)
    }
}

// Tuples

impl<A: Serde, B: Serde> Serde for (A, B) {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
        self.1.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok((A::de(reader)?, B::de(reader)?))
    }
}
