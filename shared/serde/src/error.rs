use thiserror::Error;

/// Raised when a reader runs out of bits or meets an encoding it cannot accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Failed to deserialize: buffer ended early or contained an invalid encoding")]
pub struct SerdeErr;
