use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, serde::Serde};

pub type UnsignedInteger<const BITS: u8> = SerdeInteger<false, false, BITS>;
pub type SignedInteger<const BITS: u8> = SerdeInteger<true, false, BITS>;
pub type UnsignedVariableInteger<const BITS: u8> = SerdeInteger<false, true, BITS>;
pub type SignedVariableInteger<const BITS: u8> = SerdeInteger<true, true, BITS>;

/// An integer packed into `BITS` bits.
///
/// Signed integers carry a leading sign bit followed by the magnitude.
/// Variable integers are emitted in `BITS`-wide groups, each preceded by a
/// "more follows" bit, so small magnitudes stay small on the wire.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SerdeInteger<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> {
    value: i128,
}

impl<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> SerdeInteger<SIGNED, VARIABLE, BITS> {
    /// Panics if `value` cannot be represented, which is a programming error
    /// at the call site rather than a wire condition.
    pub fn new<T: Into<i128>>(value: T) -> Self {
        let value = value.into();
        assert!(BITS > 0 && BITS < 128, "integer width must be within 1..=127 bits");
        assert!(
            SIGNED || value >= 0,
            "can't encode a negative number with an unsigned integer"
        );
        if !VARIABLE {
            let limit = 1_i128 << BITS;
            assert!(
                value.abs() < limit,
                "with {} bits, can't encode {}",
                BITS,
                value
            );
        }
        Self { value }
    }

    pub fn get(&self) -> i128 {
        self.value
    }
}

fn write_magnitude(writer: &mut dyn BitWrite, mut magnitude: u128, variable: bool, bits: u8) {
    if !variable {
        for _ in 0..bits {
            writer.write_bit(magnitude & 1 != 0);
            magnitude >>= 1;
        }
        return;
    }
    loop {
        let proceed = magnitude >> bits != 0;
        writer.write_bit(proceed);
        for _ in 0..bits {
            writer.write_bit(magnitude & 1 != 0);
            magnitude >>= 1;
        }
        if !proceed {
            return;
        }
    }
}

fn read_magnitude(reader: &mut BitReader, variable: bool, bits: u8) -> Result<u128, SerdeErr> {
    let mut output: u128 = 0;
    let mut shift: u32 = 0;
    loop {
        let proceed = if variable { reader.read_bit()? } else { false };
        for _ in 0..bits {
            if reader.read_bit()? {
                if shift >= 127 {
                    return Err(SerdeErr);
                }
                output |= 1 << shift;
            }
            shift += 1;
        }
        if !proceed {
            return Ok(output);
        }
    }
}

impl<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> Serde for SerdeInteger<SIGNED, VARIABLE, BITS> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        if SIGNED {
            writer.write_bit(self.value < 0);
        }
        write_magnitude(writer, self.value.unsigned_abs(), VARIABLE, BITS);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let negative = SIGNED && reader.read_bit()?;
        let magnitude = read_magnitude(reader, VARIABLE, BITS)? as i128;
        let value = if negative { -magnitude } else { magnitude };
        Ok(Self { value })
    }
}

impl<const SIGNED: bool, const VARIABLE: bool, const BITS: u8, T: Into<i128>> From<T> for SerdeInteger<SIGNED, VARIABLE, BITS> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}
