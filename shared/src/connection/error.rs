use thiserror::Error;

use crate::{
    connection::chunk::ChunkKind,
    schema::error::SchemaError,
    types::{ClassId, NetId, RpcId},
    world::error::WorldError,
};

/// Malformed or illegal input from the remote peer. Fatal for the
/// connection: the channel is torn down and the connection dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    /// The packet's length prefix does not match its size
    #[error("Packet declares {declared} bytes but carries {actual}")]
    PacketLengthMismatch { declared: usize, actual: usize },

    /// A chunk kind byte that no chunk uses
    #[error("Unknown chunk kind {kind}")]
    UnknownChunkKind { kind: u8 },

    /// A chunk's declared length disagrees with what its decoder consumed
    #[error("{kind:?} chunk declares {declared} bytes, {unread_bits} bits were left unread or missing")]
    ChunkLengthMismatch {
        kind: ChunkKind,
        declared: usize,
        unread_bits: usize,
    },

    /// A chunk body could not be decoded
    #[error("Malformed {kind:?} chunk")]
    MalformedChunk { kind: ChunkKind },

    /// A chunk this side never expects to receive
    #[error("{kind:?} chunks are not accepted by this side of the connection")]
    UnexpectedChunk { kind: ChunkKind },

    /// Data for an object that was never created on this channel
    #[error("Object {net_id} is unknown and the chunk carries no create flag")]
    UnknownObject { net_id: NetId },

    /// A create flag for an object that already exists
    #[error("Object {net_id} was created twice")]
    DuplicateCreate { net_id: NetId },

    /// An update for an actor the authority has torn off
    #[error("Object {net_id} was torn off and accepts no further updates")]
    UpdateAfterTearOff { net_id: NetId },

    /// A network id outside the 16-bit range
    #[error("Network id {net_id} is out of range")]
    NetIdOutOfRange { net_id: i64 },

    /// A presence bitmap wider than the class's field list
    #[error("Object {net_id} of class {class_id} carries a {num_bits}-bit field bitmap for {field_count} fields")]
    FieldCountExceeded {
        net_id: NetId,
        class_id: ClassId,
        num_bits: usize,
        field_count: usize,
    },

    /// A delta-encoded field with no previously received value to apply it to
    #[error("Field {field} of object {net_id} is delta-encoded but has no baseline")]
    DeltaWithoutBaseline { net_id: NetId, field: usize },

    /// An RPC id that was never registered
    #[error("RPC id {rpc_id} is not registered")]
    UnknownRpc { rpc_id: RpcId },

    /// An RPC whose domain this side may not receive
    #[error("RPC {rpc_id} may not be invoked from the remote side")]
    IllegalRemoteCall { rpc_id: RpcId },

    /// An RPC targeting an object of another class
    #[error("RPC {rpc_id} targets object {net_id} of the wrong class")]
    RpcClassMismatch { rpc_id: RpcId, net_id: NetId },
}

/// Errors raised by a replication channel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Protocol violation: {0}")]
    ProtocolViolation(#[from] ProtocolViolation),

    #[error("World error: {0}")]
    World(#[from] WorldError),

    /// A chunk too large for its 16-bit length prefix
    #[error("Chunk body of {bytes} bytes exceeds the frame limit")]
    ChunkTooLarge { bytes: usize },
}
