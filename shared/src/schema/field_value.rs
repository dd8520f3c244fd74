use std::{any::Any, fmt::Debug};

use crate::types::NetId;

/// The declared type of a replicated field or RPC parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    Bool,
    U8,
    U16,
    U32,
    I32,
    I64,
    F32,
    Vec2,
    Vec3,
    String,
    Bytes,
    /// A reference to another replicated object
    Reference,
    /// A type encoded by a serializer registered under this name
    Custom(&'static str),
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::U8 => "u8",
            FieldType::U16 => "u16",
            FieldType::U32 => "u32",
            FieldType::I32 => "i32",
            FieldType::I64 => "i64",
            FieldType::F32 => "f32",
            FieldType::Vec2 => "vec2",
            FieldType::Vec3 => "vec3",
            FieldType::String => "string",
            FieldType::Bytes => "bytes",
            FieldType::Reference => "reference",
            FieldType::Custom(name) => *name,
        }
    }
}

/// Payload of a [`FieldValue::Custom`].
///
/// Implemented for any `Clone + PartialEq + Debug` type, so user values can
/// be stored without a wrapper.
pub trait CustomData: Any + Debug + Send + Sync {
    fn clone_box(&self) -> Box<dyn CustomData>;
    fn eq_dyn(&self, other: &dyn CustomData) -> bool;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Debug + Clone + PartialEq + Send + Sync> CustomData for T {
    fn clone_box(&self) -> Box<dyn CustomData> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn CustomData) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Clone for Box<dyn CustomData> {
    fn clone(&self) -> Self {
        (**self).clone_box()
    }
}

impl PartialEq for Box<dyn CustomData> {
    fn eq(&self, other: &Self) -> bool {
        (**self).eq_dyn(&**other)
    }
}

/// A dynamically typed field value.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    I32(i32),
    I64(i64),
    F32(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    String(String),
    Bytes(Vec<u8>),
    Reference(Option<NetId>),
    Custom(Box<dyn CustomData>),
}

impl FieldValue {
    pub fn custom<T: CustomData>(value: T) -> Self {
        FieldValue::Custom(Box::new(value))
    }

    pub fn as_custom<T: 'static>(&self) -> Option<&T> {
        match self {
            FieldValue::Custom(data) => (**data).as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// The referenced object, if this is a non-null reference
    pub fn as_reference(&self) -> Option<NetId> {
        match self {
            FieldValue::Reference(id) => *id,
            _ => None,
        }
    }

    pub fn matches(&self, field_type: &FieldType) -> bool {
        matches!(
            (self, field_type),
            (FieldValue::Bool(_), FieldType::Bool)
                | (FieldValue::U8(_), FieldType::U8)
                | (FieldValue::U16(_), FieldType::U16)
                | (FieldValue::U32(_), FieldType::U32)
                | (FieldValue::I32(_), FieldType::I32)
                | (FieldValue::I64(_), FieldType::I64)
                | (FieldValue::F32(_), FieldType::F32)
                | (FieldValue::Vec2(_), FieldType::Vec2)
                | (FieldValue::Vec3(_), FieldType::Vec3)
                | (FieldValue::String(_), FieldType::String)
                | (FieldValue::Bytes(_), FieldType::Bytes)
                | (FieldValue::Reference(_), FieldType::Reference)
                | (FieldValue::Custom(_), FieldType::Custom(_))
        )
    }
}
