use thiserror::Error;

use crate::types::{ClassId, FieldIndex, RpcId};

/// Errors raised while building or consulting class and RPC schemas.
///
/// These are fatal: they indicate a registration mistake, not a transient
/// wire condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two classes were registered under the same id
    #[error("Class id {class_id} is registered more than once")]
    DuplicateClass { class_id: ClassId },

    /// Two RPCs were registered under the same id
    #[error("RPC id {rpc_id} is registered more than once")]
    DuplicateRpc { rpc_id: RpcId },

    /// The class declares more fields than the presence bitmap can describe
    #[error("Class {class_id} declares {field_count} replicated fields, the maximum is {max}")]
    TooManyFields {
        class_id: ClassId,
        field_count: usize,
        max: usize,
    },

    /// A field or parameter names a custom type with no registered serializer
    #[error("No serializer registered for type '{type_name}' used by '{owner}'")]
    UnresolvedSerializer { owner: String, type_name: String },

    /// The class id was never registered
    #[error("Class id {class_id} is not registered")]
    UnknownClass { class_id: ClassId },

    /// A field index is outside the class's field list
    #[error("Class {class_id} has no field at index {index}")]
    UnknownField { class_id: ClassId, index: FieldIndex },

    /// A value does not match the type its serializer encodes
    #[error("Serializer for '{type_name}' cannot encode the given value")]
    FieldTypeMismatch { type_name: String },
}
