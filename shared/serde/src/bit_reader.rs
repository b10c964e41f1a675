use crate::error::SerdeErr;

/// Reads bits back out of a buffer produced by `BitWriter`
pub struct BitReader<'b> {
    buffer: &'b [u8],
    position: usize,
}

impl<'b> BitReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        let byte_index = self.position / 8;
        if byte_index >= self.buffer.len() {
            return Err(SerdeErr);
        }
        let bit = (self.buffer[byte_index] >> (self.position % 8)) & 1 != 0;
        self.position += 1;
        Ok(bit)
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        if self.position % 8 == 0 {
            let byte_index = self.position / 8;
            let byte = *self.buffer.get(byte_index).ok_or(SerdeErr)?;
            self.position += 8;
            return Ok(byte);
        }
        Ok(self.read_bits(8)? as u8)
    }

    pub fn read_bits(&mut self, bits: u8) -> Result<u64, SerdeErr> {
        let mut output: u64 = 0;
        for index in 0..bits {
            if self.read_bit()? {
                output |= 1 << index;
            }
        }
        Ok(output)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, SerdeErr> {
        if count.saturating_mul(8) > self.bits_remaining() {
            return Err(SerdeErr);
        }
        let mut output = Vec::with_capacity(count);
        for _ in 0..count {
            output.push(self.read_byte()?);
        }
        Ok(output)
    }

    pub fn bits_remaining(&self) -> usize {
        (self.buffer.len() * 8).saturating_sub(self.position)
    }

    /// True once only the zero padding of the final byte is left
    pub fn is_finished(&self) -> bool {
        self.bits_remaining() < 8
    }
}
