use crate::error::SerdeErr;

/// Reads bits in the order a [`BitWriter`](crate::BitWriter) wrote them.
pub struct BitReader<'b> {
    buffer: &'b [u8],
    bit_index: usize,
}

impl<'b> BitReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            bit_index: 0,
        }
    }

    pub fn bits_read(&self) -> usize {
        self.bit_index
    }

    pub fn bits_remaining(&self) -> usize {
        self.buffer.len() * 8 - self.bit_index
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        let Some(byte) = self.buffer.get(self.bit_index / 8) else {
            return Err(SerdeErr);
        };
        let bit = (byte >> (self.bit_index % 8)) & 1 != 0;
        self.bit_index += 1;
        Ok(bit)
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        if self.bit_index % 8 == 0 {
            let Some(byte) = self.buffer.get(self.bit_index / 8) else {
                return Err(SerdeErr);
            };
            self.bit_index += 8;
            return Ok(*byte);
        }
        let mut output = 0u8;
        for offset in 0..8 {
            if self.read_bit()? {
                output |= 1 << offset;
            }
        }
        Ok(output)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, SerdeErr> {
        if count * 8 > self.bits_remaining() {
            return Err(SerdeErr);
        }
        let mut output = Vec::with_capacity(count);
        for _ in 0..count {
            output.push(self.read_byte()?);
        }
        Ok(output)
    }
}
