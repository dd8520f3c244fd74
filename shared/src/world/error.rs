use thiserror::Error;

use crate::types::{ClassId, FieldIndex, NetId};

/// Errors that can occur while managing the object world
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    /// Every network id below the reserved sentinel is in use
    #[error("No network ids left to allocate")]
    IdPoolExhausted,

    /// The object is not in the world
    #[error("Object {net_id} does not exist")]
    ObjectNotFound { net_id: NetId },

    /// A shadow with this id is already present
    #[error("Object {net_id} already exists")]
    DuplicateObject { net_id: NetId },

    /// Only the authority may perform this operation
    #[error("Only the authority may {operation}")]
    NotAuthority { operation: &'static str },

    /// Only a subordinate peer may perform this operation
    #[error("The authority cannot {operation}")]
    NotSubordinate { operation: &'static str },

    /// The operation needs actor state the object does not have
    #[error("Object {net_id} is not an actor")]
    NotAnActor { net_id: NetId },

    /// The field index is outside the class's field list
    #[error("Class {class_id} has no field at index {index}")]
    FieldOutOfRange { class_id: ClassId, index: FieldIndex },

    /// The value does not match the field's declared type
    #[error("Value does not match the type of field {index} of class {class_id}")]
    FieldTypeMismatch { class_id: ClassId, index: FieldIndex },

    /// The class id was never registered
    #[error("Class id {class_id} is not registered")]
    UnknownClass { class_id: ClassId },
}
