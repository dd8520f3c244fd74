use thiserror::Error;

use tether_shared::{ConnectionId, RpcError, WorldError};

/// Errors returned by the server API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TetherServerError {
    /// The connection was never accepted or has already been dropped
    #[error("Connection {connection:?} does not exist")]
    UnknownConnection { connection: ConnectionId },

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("World error: {0}")]
    World(#[from] WorldError),
}
