//! # Tether Client
//! The subordinate side of a tether session: a shadow copy of the objects
//! the server replicates to this client, level loading and server RPCs.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use tether_shared::{
        ChannelConfig, ClassSchema, ConnectionId, FieldSpec, FieldType, FieldValue, LevelId,
        LoopbackTransport, NetId, ObjectWorld, Protocol, ReplicationCondition, RpcDelivery,
        RpcDomain, RpcSpec, Transport,
    };
}

mod client;
mod error;
mod events;

pub use client::{Client, ClientConfig};
pub use error::TetherClientError;
pub use events::ClientEvent;
pub use tether_shared::DisconnectReason;
