use std::any::Any;

use crate::{
    schema::{
        field_registry::ClassInfo,
        field_value::{FieldType, FieldValue},
    },
    types::{ClassId, FieldIndex},
    world::{error::WorldError, replicate::Replicate},
};

/// A schema-driven object that stores its fields as dynamic values.
#[derive(Clone, Debug)]
pub struct DynamicObject {
    class_id: ClassId,
    types: Vec<FieldType>,
    values: Vec<FieldValue>,
}

impl DynamicObject {
    pub fn new(class: &ClassInfo) -> Self {
        Self {
            class_id: class.class_id(),
            types: class.fields().iter().map(|field| field.field_type).collect(),
            values: class
                .fields()
                .iter()
                .map(|field| field.serde.default_value())
                .collect(),
        }
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }
}

impl Replicate for DynamicObject {
    fn class_id(&self) -> ClassId {
        self.class_id
    }

    fn field(&self, index: FieldIndex) -> Option<FieldValue> {
        self.values.get(usize::from(index)).cloned()
    }

    fn set_field(&mut self, index: FieldIndex, value: FieldValue) -> Result<(), WorldError> {
        let slot = usize::from(index);
        let Some(field_type) = self.types.get(slot) else {
            return Err(WorldError::FieldOutOfRange {
                class_id: self.class_id,
                index,
            });
        };
        if !value.matches(field_type) {
            return Err(WorldError::FieldTypeMismatch {
                class_id: self.class_id,
                index,
            });
        }
        self.values[slot] = value;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
