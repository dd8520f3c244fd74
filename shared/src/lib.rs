//! # Tether Shared
//! Object replication and RPC routing shared between tether-server &
//! tether-client crates.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use tether_serde::{
    BitReader, BitWrite, BitWriter, Serde, SerdeErr, SerdeInteger, SignedInteger,
    SignedVariableInteger, UnsignedInteger, UnsignedVariableInteger,
};

mod connection;
mod constants;
mod protocol;
mod replication;
mod rpc;
mod schema;
mod transport;
mod types;
mod world;

pub use connection::{
    channel_config::ChannelConfig,
    channel_event::{ChannelEvent, DisconnectReason, IncomingRpc},
    channel_state::ChannelState,
    chunk::{ChunkKind, CreateInfo, ObjectHeader, RpcChunk},
    error::{ChannelError, ProtocolViolation},
    packet::{PacketReader, PacketWriter},
    ping_manager::PingManager,
    replication_channel::{DropReason, ReplicationChannel, RpcDelivery},
};
pub use constants::{
    CHUNK_HEADER_BYTES, MAX_CHUNK_BODY_BYTES, MAX_FIELD_COUNT, MAX_PACKET_BYTES, NO_OUTER,
    PACKET_HEADER_BYTES,
};
pub use protocol::{Protocol, ProtocolError};
pub use replication::{
    dependency_resolver::{DependencyQueue, PendingField, PendingReferences},
    field_tracker::{FieldDeltaTracker, ReplicatedFieldState, SendParams},
    object_replicator::ObjectReplicator,
};
pub use rpc::{
    error::RpcError,
    rpc_router::{OutgoingRpc, PreparedRpc, RpcRouter},
    rpc_spec::{ResolvedRpc, RpcDomain, RpcSpec},
};
pub use schema::{
    class_schema::{ClassSchema, FieldSpec, ObjectFactory, OnChanged},
    condition::ReplicationCondition,
    error::SchemaError,
    field_registry::{ClassInfo, FieldRegistry, ResolvedField},
    field_value::{CustomData, FieldType, FieldValue},
    serializer::{BuiltinSerde, FieldSerde},
};
pub use transport::{error::TransportError, loopback::LoopbackTransport, Transport};
pub use types::{ClassId, ConnectionId, FieldIndex, HostType, LevelId, NetId, RpcId};
pub use world::{
    dynamic_object::DynamicObject,
    error::WorldError,
    net_id_pool::NetIdPool,
    object_world::{ActorState, NetObject, ObjectWorld},
    relevancy::Relevancy,
    replicate::Replicate,
};
