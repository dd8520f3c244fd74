//! # Tether Server
//! The authority side of a tether session: owns the replicated world,
//! accepts client transports, runs every channel's replication sweep and
//! routes RPCs.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use tether_shared::{
        ActorState, ChannelConfig, ClassSchema, ConnectionId, FieldSpec, FieldType, FieldValue,
        LevelId, LoopbackTransport, NetId, ObjectWorld, Protocol, Relevancy, ReplicationCondition,
        RpcDelivery, RpcDomain, RpcSpec, Transport,
    };
}

mod connection;
mod error;
mod events;
mod server;

pub use error::TetherServerError;
pub use events::ServerEvent;
pub use server::{Server, ServerConfig};
pub use tether_shared::DisconnectReason;
