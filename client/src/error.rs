use thiserror::Error;

use tether_shared::RpcError;

/// Errors returned by the client API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TetherClientError {
    /// The connection to the server has been dropped
    #[error("Client is disconnected")]
    Disconnected,

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),
}
