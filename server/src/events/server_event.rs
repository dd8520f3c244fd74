use tether_shared::{ConnectionId, DisconnectReason, IncomingRpc, LevelId};

#[derive(Clone, Debug, PartialEq)]
pub enum ServerEvent {
    Connected(ConnectionId),
    /// The client finished loading the server's current level
    Synced {
        connection: ConnectionId,
        level: LevelId,
    },
    Rpc(IncomingRpc),
    Disconnected {
        connection: ConnectionId,
        reason: DisconnectReason,
    },
}
