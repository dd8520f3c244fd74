use std::any::Any;

use crate::{
    schema::field_value::FieldValue,
    types::{ClassId, FieldIndex},
    world::error::WorldError,
};

/// A game object whose fields are replicated.
///
/// Field indices follow the order the class schema declares them in.
pub trait Replicate: Any + Send {
    fn class_id(&self) -> ClassId;

    /// Returns a copy of the field's current value
    fn field(&self, index: FieldIndex) -> Option<FieldValue>;

    fn set_field(&mut self, index: FieldIndex, value: FieldValue) -> Result<(), WorldError>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
