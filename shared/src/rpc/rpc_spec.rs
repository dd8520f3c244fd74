use std::sync::Arc;

use crate::{
    schema::{field_value::FieldType, serializer::FieldSerde},
    types::{ClassId, HostType, RpcId},
};

/// Routing policy of a remote call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RpcDomain {
    /// Subordinate -> authority
    Server,
    /// Authority -> the target's owning connection
    Owner,
    /// Authority -> every connection
    Multicast,
    /// Authority -> every connection except the owner's
    MulticastExcludeOwner,
}

impl RpcDomain {
    /// Whether a host of the given kind may invoke calls in this domain
    pub fn is_callable_by(&self, host_type: HostType) -> bool {
        match host_type {
            HostType::Server => !matches!(self, RpcDomain::Server),
            HostType::Client => matches!(self, RpcDomain::Server),
        }
    }

    /// Whether a host of the given kind may accept calls in this domain
    /// from its remote peer
    pub fn is_receivable_by(&self, host_type: HostType) -> bool {
        self.is_callable_by(host_type.invert())
    }
}

/// Declares one remote call on a class.
#[derive(Clone, Debug)]
pub struct RpcSpec {
    pub rpc_id: RpcId,
    pub name: String,
    pub class_id: ClassId,
    pub domain: RpcDomain,
    pub params: Vec<FieldType>,
}

impl RpcSpec {
    pub fn new(rpc_id: RpcId, name: impl Into<String>, class_id: ClassId, domain: RpcDomain) -> Self {
        Self {
            rpc_id,
            name: name.into(),
            class_id,
            domain,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, field_type: FieldType) -> Self {
        self.params.push(field_type);
        self
    }
}

/// An RPC whose parameter serializers have been resolved
pub struct ResolvedRpc {
    pub spec: RpcSpec,
    pub params: Vec<Arc<dyn FieldSerde>>,
}
