pub mod class_schema;
pub mod condition;
pub mod error;
pub mod field_registry;
pub mod field_value;
pub mod serializer;
