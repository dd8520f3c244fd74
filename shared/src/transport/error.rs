use thiserror::Error;

/// Errors raised by a packet transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The remote end of the pipe has been closed
    #[error("Transport is closed")]
    Closed,

    /// A peer panicked while holding the shared queue
    #[error("Transport queue was poisoned")]
    Poisoned,
}
