use thiserror::Error;

use crate::schema::error::SchemaError;

/// Errors that can occur while building a protocol
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Protocol is locked and cannot be modified
    #[error("Protocol is already locked and cannot be modified. Protocol.build() has been called and no further changes are allowed")]
    AlreadyLocked,

    /// A class or RPC failed to resolve
    #[error("Protocol schema error: {0}")]
    Schema(#[from] SchemaError),
}
