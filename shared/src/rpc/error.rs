use thiserror::Error;

use crate::{
    rpc::rpc_spec::RpcDomain,
    types::{ClassId, HostType, NetId, RpcId},
};

/// Errors returned when invoking a remote call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// The call's domain cannot be invoked by this host
    #[error("A {host_type:?} host cannot invoke a {domain:?} RPC")]
    IllegalDomainCall { domain: RpcDomain, host_type: HostType },

    /// The RPC id was never registered
    #[error("RPC id {rpc_id} is not registered")]
    UnknownRpc { rpc_id: RpcId },

    /// The target object is not in the world
    #[error("RPC target {net_id} does not exist")]
    UnknownObject { net_id: NetId },

    /// The target object's class does not declare this RPC
    #[error("RPC {rpc_id} belongs to class {expected}, target is class {actual}")]
    WrongClass {
        rpc_id: RpcId,
        expected: ClassId,
        actual: ClassId,
    },

    /// The number of arguments does not match the declaration
    #[error("RPC {rpc_id} takes {expected} arguments, {actual} were given")]
    ArgumentCount {
        rpc_id: RpcId,
        expected: usize,
        actual: usize,
    },

    /// An argument does not match its declared type
    #[error("Argument {index} of RPC {rpc_id} has the wrong type")]
    ArgumentType { rpc_id: RpcId, index: usize },
}
