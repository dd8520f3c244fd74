use tether_serde::{BitReader, BitWrite, Serde, SerdeErr, SignedVariableInteger};

use crate::{
    schema::{
        error::SchemaError,
        field_value::{FieldType, FieldValue},
    },
    types::NetId,
};

/// Encodes, decodes and compares the values of one field type.
///
/// Implementations that return `true` from `supports_delta` must be able to
/// reconstruct a value from a baseline plus whatever `ser_delta` wrote.
pub trait FieldSerde: Send + Sync {
    fn type_name(&self) -> &str;

    fn default_value(&self) -> FieldValue;

    fn accepts(&self, value: &FieldValue) -> bool;

    fn ser(&self, value: &FieldValue, writer: &mut dyn BitWrite) -> Result<(), SchemaError>;

    fn de(&self, reader: &mut BitReader) -> Result<FieldValue, SerdeErr>;

    fn supports_delta(&self) -> bool {
        false
    }

    fn ser_delta(
        &self,
        _baseline: &FieldValue,
        value: &FieldValue,
        writer: &mut dyn BitWrite,
    ) -> Result<(), SchemaError> {
        self.ser(value, writer)
    }

    fn de_delta(&self, _baseline: &FieldValue, reader: &mut BitReader) -> Result<FieldValue, SerdeErr> {
        self.de(reader)
    }

    fn equals(&self, a: &FieldValue, b: &FieldValue) -> bool {
        a == b
    }

    fn copy_value(&self, value: &FieldValue) -> FieldValue {
        value.clone()
    }
}

/// Serializer for every non-custom [`FieldType`].
pub struct BuiltinSerde {
    field_type: FieldType,
}

impl BuiltinSerde {
    /// Returns `None` for custom types, which need a registered serializer
    pub fn new(field_type: FieldType) -> Option<Self> {
        match field_type {
            FieldType::Custom(_) => None,
            field_type => Some(Self { field_type }),
        }
    }

    fn mismatch(&self) -> SchemaError {
        SchemaError::FieldTypeMismatch {
            type_name: self.field_type.name().to_string(),
        }
    }
}

fn integer_of(value: &FieldValue) -> Option<i128> {
    match value {
        FieldValue::U8(v) => Some(i128::from(*v)),
        FieldValue::U16(v) => Some(i128::from(*v)),
        FieldValue::U32(v) => Some(i128::from(*v)),
        FieldValue::I32(v) => Some(i128::from(*v)),
        FieldValue::I64(v) => Some(i128::from(*v)),
        _ => None,
    }
}

fn integer_as(field_type: FieldType, value: i128) -> Option<FieldValue> {
    match field_type {
        FieldType::U8 => u8::try_from(value).ok().map(FieldValue::U8),
        FieldType::U16 => u16::try_from(value).ok().map(FieldValue::U16),
        FieldType::U32 => u32::try_from(value).ok().map(FieldValue::U32),
        FieldType::I32 => i32::try_from(value).ok().map(FieldValue::I32),
        FieldType::I64 => i64::try_from(value).ok().map(FieldValue::I64),
        _ => None,
    }
}

fn components(value: &FieldValue) -> Option<&[f32]> {
    match value {
        FieldValue::Vec2(v) => Some(&v[..]),
        FieldValue::Vec3(v) => Some(&v[..]),
        _ => None,
    }
}

impl FieldSerde for BuiltinSerde {
    fn type_name(&self) -> &str {
        self.field_type.name()
    }

    fn default_value(&self) -> FieldValue {
        match self.field_type {
            FieldType::Bool => FieldValue::Bool(false),
            FieldType::U8 => FieldValue::U8(0),
            FieldType::U16 => FieldValue::U16(0),
            FieldType::U32 => FieldValue::U32(0),
            FieldType::I32 => FieldValue::I32(0),
            FieldType::I64 => FieldValue::I64(0),
            FieldType::F32 => FieldValue::F32(0.0),
            FieldType::Vec2 => FieldValue::Vec2([0.0; 2]),
            FieldType::Vec3 => FieldValue::Vec3([0.0; 3]),
            FieldType::String => FieldValue::String(String::new()),
            FieldType::Bytes => FieldValue::Bytes(Vec::new()),
            FieldType::Reference | FieldType::Custom(_) => FieldValue::Reference(None),
        }
    }

    fn accepts(&self, value: &FieldValue) -> bool {
        value.matches(&self.field_type)
    }

    fn ser(&self, value: &FieldValue, writer: &mut dyn BitWrite) -> Result<(), SchemaError> {
        match (self.field_type, value) {
            (FieldType::Bool, FieldValue::Bool(v)) => v.ser(writer),
            (FieldType::U8, FieldValue::U8(v)) => v.ser(writer),
            (FieldType::U16, FieldValue::U16(v)) => v.ser(writer),
            (FieldType::U32, FieldValue::U32(v)) => v.ser(writer),
            (FieldType::I32, FieldValue::I32(v)) => v.ser(writer),
            (FieldType::I64, FieldValue::I64(v)) => v.ser(writer),
            (FieldType::F32, FieldValue::F32(v)) => v.ser(writer),
            (FieldType::Vec2, FieldValue::Vec2(v)) => v.iter().for_each(|c| c.ser(writer)),
            (FieldType::Vec3, FieldValue::Vec3(v)) => v.iter().for_each(|c| c.ser(writer)),
            (FieldType::String, FieldValue::String(v)) => v.ser(writer),
            (FieldType::Bytes, FieldValue::Bytes(v)) => v.ser(writer),
            (FieldType::Reference, FieldValue::Reference(v)) => v.ser(writer),
            _ => return Err(self.mismatch()),
        }
        Ok(())
    }

    fn de(&self, reader: &mut BitReader) -> Result<FieldValue, SerdeErr> {
        Ok(match self.field_type {
            FieldType::Bool => FieldValue::Bool(bool::de(reader)?),
            FieldType::U8 => FieldValue::U8(u8::de(reader)?),
            FieldType::U16 => FieldValue::U16(u16::de(reader)?),
            FieldType::U32 => FieldValue::U32(u32::de(reader)?),
            FieldType::I32 => FieldValue::I32(i32::de(reader)?),
            FieldType::I64 => FieldValue::I64(i64::de(reader)?),
            FieldType::F32 => FieldValue::F32(f32::de(reader)?),
            FieldType::Vec2 => FieldValue::Vec2([f32::de(reader)?, f32::de(reader)?]),
            FieldType::Vec3 => {
                FieldValue::Vec3([f32::de(reader)?, f32::de(reader)?, f32::de(reader)?])
            }
            FieldType::String => FieldValue::String(String::de(reader)?),
            FieldType::Bytes => FieldValue::Bytes(Vec::<u8>::de(reader)?),
            FieldType::Reference => FieldValue::Reference(Option::<NetId>::de(reader)?),
            FieldType::Custom(_) => return Err(SerdeErr),
        })
    }

    fn supports_delta(&self) -> bool {
        matches!(
            self.field_type,
            FieldType::U8
                | FieldType::U16
                | FieldType::U32
                | FieldType::I32
                | FieldType::I64
                | FieldType::Vec2
                | FieldType::Vec3
        )
    }

    // Integers travel as a signed difference from the baseline, vectors as a
    // changed-component mask followed by the changed components.
    fn ser_delta(
        &self,
        baseline: &FieldValue,
        value: &FieldValue,
        writer: &mut dyn BitWrite,
    ) -> Result<(), SchemaError> {
        if !self.accepts(baseline) || !self.accepts(value) {
            return Err(self.mismatch());
        }
        if let (Some(old), Some(new)) = (integer_of(baseline), integer_of(value)) {
            SignedVariableInteger::<7>::new(new - old).ser(writer);
            return Ok(());
        }
        if let (Some(old), Some(new)) = (components(baseline), components(value)) {
            for (a, b) in old.iter().zip(new) {
                writer.write_bit(a.to_bits() != b.to_bits());
            }
            for (a, b) in old.iter().zip(new) {
                if a.to_bits() != b.to_bits() {
                    b.ser(writer);
                }
            }
            return Ok(());
        }
        self.ser(value, writer)
    }

    fn de_delta(&self, baseline: &FieldValue, reader: &mut BitReader) -> Result<FieldValue, SerdeErr> {
        if !self.accepts(baseline) {
            return Err(SerdeErr);
        }
        if let Some(old) = integer_of(baseline) {
            let diff = SignedVariableInteger::<7>::de(reader)?.get();
            let sum = old.checked_add(diff).ok_or(SerdeErr)?;
            return integer_as(self.field_type, sum).ok_or(SerdeErr);
        }
        if let Some(old) = components(baseline) {
            let mut output = old.to_vec();
            let mask = (0..output.len())
                .map(|_| reader.read_bit())
                .collect::<Result<Vec<bool>, SerdeErr>>()?;
            for (component, changed) in output.iter_mut().zip(mask) {
                if changed {
                    *component = f32::de(reader)?;
                }
            }
            return Ok(match output.as_slice() {
                [x, y] => FieldValue::Vec2([*x, *y]),
                [x, y, z] => FieldValue::Vec3([*x, *y, *z]),
                _ => return Err(SerdeErr),
            });
        }
        self.de(reader)
    }

    fn equals(&self, a: &FieldValue, b: &FieldValue) -> bool {
        match (a, b) {
            (FieldValue::F32(a), FieldValue::F32(b)) => a.to_bits() == b.to_bits(),
            _ => match (components(a), components(b)) {
                (Some(a), Some(b)) => {
                    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.to_bits() == b.to_bits())
                }
                _ => a == b,
            },
        }
    }
}
