/// Sink for bit-level serialization
pub trait BitWrite {
    fn write_bit(&mut self, bit: bool);
    fn write_byte(&mut self, byte: u8);

    fn write_bits(&mut self, value: u64, bits: u8) {
        let mut value = value;
        for _ in 0..bits {
            self.write_bit(value & 1 != 0);
            value >>= 1;
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.write_byte(*byte);
        }
    }
}

/// A growable BitWrite implementation. Bits fill each byte LSB first.
pub struct BitWriter {
    bytes: Vec<u8>,
    partial: u8,
    partial_len: u8,
    total_bits: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            bytes: Vec::with_capacity(64),
            partial: 0,
            partial_len: 0,
            total_bits: 0,
        }
    }

    /// Finishes writing. A trailing partial byte is zero-padded.
    pub fn to_bytes(mut self) -> Vec<u8> {
        if self.partial_len > 0 {
            self.bytes.push(self.partial);
        }
        self.bytes
    }

    pub fn bits_written(&self) -> u32 {
        self.total_bits
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWrite for BitWriter {
    fn write_bit(&mut self, bit: bool) {
        self.partial |= u8::from(bit) << self.partial_len;
        self.partial_len += 1;
        self.total_bits += 1;

        if self.partial_len == 8 {
            self.bytes.push(self.partial);
            self.partial = 0;
            self.partial_len = 0;
        }
    }

    fn write_byte(&mut self, byte: u8) {
        if self.partial_len == 0 {
            self.bytes.push(byte);
            self.total_bits += 8;
            return;
        }
        // straddles two bytes: the low bits complete the partial one
        let used = self.partial_len;
        self.bytes.push(self.partial | (byte << used));
        self.partial = byte >> (8 - used);
        self.total_bits += 8;
    }
}

/// Measures how many bits a value would take without storing them
#[derive(Default)]
pub struct BitCounter {
    bits: u32,
}

impl BitCounter {
    pub fn new() -> Self {
        Self { bits: 0 }
    }

    pub fn bits_needed(&self) -> u32 {
        self.bits
    }
}

impl BitWrite for BitCounter {
    fn write_bit(&mut self, _bit: bool) {
        self.bits += 1;
    }

    fn write_byte(&mut self, _byte: u8) {
        self.bits += 8;
    }
}
