use std::sync::Arc;

use crate::{
    schema::{condition::ReplicationCondition, field_value::{FieldType, FieldValue}},
    types::ClassId,
    world::replicate::Replicate,
};

/// Invoked on the receiving side after a field's new value is applied,
/// with the object and the field's previous value.
pub type OnChanged = Arc<dyn Fn(&mut dyn Replicate, &FieldValue) + Send + Sync>;

/// Builds a fresh instance of a class for a remote creation.
pub type ObjectFactory = Arc<dyn Fn() -> Box<dyn Replicate> + Send + Sync>;

/// Declares one replicated field of a class.
#[derive(Clone)]
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) field_type: FieldType,
    pub(crate) condition: ReplicationCondition,
    pub(crate) update_rate: f32,
    pub(crate) on_changed: Option<OnChanged>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            condition: ReplicationCondition::Always,
            update_rate: 0.0,
            on_changed: None,
        }
    }

    pub fn condition(mut self, condition: ReplicationCondition) -> Self {
        self.condition = condition;
        self
    }

    /// Minimum number of seconds between two checks of this field
    pub fn update_rate(mut self, seconds: f32) -> Self {
        self.update_rate = seconds.max(0.0);
        self
    }

    pub fn on_changed<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut dyn Replicate, &FieldValue) + Send + Sync + 'static,
    {
        self.on_changed = Some(Arc::new(callback));
        self
    }
}

/// Statically declared field table of one class, in replication order.
#[derive(Clone)]
pub struct ClassSchema {
    pub(crate) class_id: ClassId,
    pub(crate) name: String,
    pub(crate) fields: Vec<FieldSpec>,
    pub(crate) factory: Option<ObjectFactory>,
}

impl ClassSchema {
    pub fn new(class_id: ClassId, name: impl Into<String>) -> Self {
        Self {
            class_id,
            name: name.into(),
            fields: Vec::new(),
            factory: None,
        }
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Without a factory, remote instances are built as `DynamicObject`s
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Replicate> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    pub fn class_id(&self) -> ClassId {
        self.class_id
    }
}
