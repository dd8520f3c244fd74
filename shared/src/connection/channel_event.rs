use crate::{
    connection::error::ChannelError,
    schema::field_value::FieldValue,
    types::{ClassId, ConnectionId, LevelId, NetId, RpcId},
};

/// A remote call received on a channel
#[derive(Clone, Debug, PartialEq)]
pub struct IncomingRpc {
    pub from: ConnectionId,
    pub net_id: NetId,
    pub rpc_id: RpcId,
    pub args: Vec<FieldValue>,
}

/// Something a channel observed while reading packets
#[derive(Clone, Debug, PartialEq)]
pub enum ChannelEvent {
    ObjectCreated { net_id: NetId, class_id: ClassId },
    ObjectDestroyed(NetId),
    TornOff(NetId),
    RelevancyChanged { net_id: NetId, relevant: bool },
    Rpc(IncomingRpc),
    /// The authority asks this side to load a level
    TravelRequested(LevelId),
    /// The remote peer reported the level this side is on
    Synced(LevelId),
}

/// Why a connection was dropped
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisconnectReason {
    /// Nothing was heard from the peer within the configured timeout
    Timeout,
    /// The peer sent something malformed or illegal
    Channel(ChannelError),
    TransportClosed,
    /// Closed by the local application
    Manual,
}
