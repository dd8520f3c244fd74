use std::{collections::HashMap, sync::Arc};

use log::info;

use crate::{
    constants::MAX_FIELD_COUNT,
    schema::{
        class_schema::{ClassSchema, ObjectFactory, OnChanged},
        condition::ReplicationCondition,
        error::SchemaError,
        field_value::FieldType,
        serializer::{BuiltinSerde, FieldSerde},
    },
    types::{ClassId, FieldIndex},
    world::{dynamic_object::DynamicObject, replicate::Replicate},
};

/// A field whose serializer has been resolved.
pub struct ResolvedField {
    pub index: FieldIndex,
    pub name: String,
    pub field_type: FieldType,
    pub condition: ReplicationCondition,
    pub update_rate: f32,
    pub serde: Arc<dyn FieldSerde>,
    pub on_changed: Option<OnChanged>,
}

/// The immutable, resolved schema of one class.
pub struct ClassInfo {
    class_id: ClassId,
    name: String,
    fields: Vec<ResolvedField>,
    factory: Option<ObjectFactory>,
}

impl ClassInfo {
    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[ResolvedField] {
        &self.fields
    }

    pub fn field(&self, index: FieldIndex) -> Option<&ResolvedField> {
        self.fields.get(usize::from(index))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Builds a new instance with every field at its default value
    pub fn instantiate(&self) -> Box<dyn Replicate> {
        match &self.factory {
            Some(factory) => factory(),
            None => Box::new(DynamicObject::new(self)),
        }
    }
}

/// Class id -> resolved field list, built once and shared read-only.
#[derive(Default)]
pub struct FieldRegistry {
    classes: HashMap<ClassId, Arc<ClassInfo>>,
    serializers: HashMap<String, Arc<dyn FieldSerde>>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_serializer(&mut self, type_name: impl Into<String>, serde: Arc<dyn FieldSerde>) {
        self.serializers.insert(type_name.into(), serde);
    }

    pub fn resolve_serializer(
        &self,
        field_type: FieldType,
        owner: &str,
    ) -> Result<Arc<dyn FieldSerde>, SchemaError> {
        if let Some(builtin) = BuiltinSerde::new(field_type) {
            return Ok(Arc::new(builtin));
        }
        self.serializers
            .get(field_type.name())
            .cloned()
            .ok_or_else(|| SchemaError::UnresolvedSerializer {
                owner: owner.to_string(),
                type_name: field_type.name().to_string(),
            })
    }

    pub fn register(&mut self, schema: ClassSchema) -> Result<Arc<ClassInfo>, SchemaError> {
        if self.classes.contains_key(&schema.class_id) {
            return Err(SchemaError::DuplicateClass {
                class_id: schema.class_id,
            });
        }
        if schema.fields.len() > MAX_FIELD_COUNT {
            return Err(SchemaError::TooManyFields {
                class_id: schema.class_id,
                field_count: schema.fields.len(),
                max: MAX_FIELD_COUNT,
            });
        }

        let mut fields = Vec::with_capacity(schema.fields.len());
        for (index, spec) in schema.fields.into_iter().enumerate() {
            let owner = format!("{}.{}", schema.name, spec.name);
            let serde = self.resolve_serializer(spec.field_type, &owner)?;
            fields.push(ResolvedField {
                // bounded by MAX_FIELD_COUNT above
                index: index as FieldIndex,
                name: spec.name,
                field_type: spec.field_type,
                condition: spec.condition,
                update_rate: spec.update_rate,
                serde,
                on_changed: spec.on_changed,
            });
        }

        info!(
            "Registered class {} ({}) with {} replicated fields",
            schema.class_id,
            schema.name,
            fields.len()
        );

        let info = Arc::new(ClassInfo {
            class_id: schema.class_id,
            name: schema.name,
            fields,
            factory: schema.factory,
        });
        self.classes.insert(info.class_id, info.clone());
        Ok(info)
    }

    pub fn class(&self, class_id: ClassId) -> Result<&Arc<ClassInfo>, SchemaError> {
        self.classes
            .get(&class_id)
            .ok_or(SchemaError::UnknownClass { class_id })
    }

    pub fn contains(&self, class_id: ClassId) -> bool {
        self.classes.contains_key(&class_id)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
