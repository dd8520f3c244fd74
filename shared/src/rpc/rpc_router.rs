use std::sync::Arc;

use tether_serde::{BitReader, BitWriter, SerdeErr};

use crate::{
    protocol::Protocol,
    rpc::{
        error::RpcError,
        rpc_spec::{ResolvedRpc, RpcDomain},
    },
    schema::field_value::FieldValue,
    types::{ConnectionId, HostType, NetId, RpcId},
    world::object_world::ObjectWorld,
};

/// An encoded call waiting to be written by a channel.
#[derive(Clone, Debug, PartialEq)]
pub struct OutgoingRpc {
    pub net_id: NetId,
    pub rpc_id: RpcId,
    pub args: Vec<u8>,
    /// Objects named by the arguments, fed through the dependency closure
    pub references: Vec<NetId>,
}

/// A validated call together with what its recipients depend on
#[derive(Clone, Debug)]
pub struct PreparedRpc {
    pub domain: RpcDomain,
    pub owner: Option<ConnectionId>,
    pub rpc: OutgoingRpc,
}

/// Validates calls against the local role and resolves their recipients.
pub struct RpcRouter {
    protocol: Arc<Protocol>,
    host_type: HostType,
}

impl RpcRouter {
    pub fn new(protocol: Arc<Protocol>, host_type: HostType) -> Self {
        Self { protocol, host_type }
    }

    pub fn host_type(&self) -> HostType {
        self.host_type
    }

    pub fn validate(&self, domain: RpcDomain) -> Result<(), RpcError> {
        if domain.is_callable_by(self.host_type) {
            Ok(())
        } else {
            Err(RpcError::IllegalDomainCall {
                domain,
                host_type: self.host_type,
            })
        }
    }

    /// Checks the call and encodes its arguments. Nothing is queued.
    pub fn prepare(
        &self,
        world: &ObjectWorld,
        net_id: NetId,
        rpc_id: RpcId,
        args: &[FieldValue],
    ) -> Result<PreparedRpc, RpcError> {
        let rpc = self
            .protocol
            .rpc(rpc_id)
            .ok_or(RpcError::UnknownRpc { rpc_id })?;
        self.validate(rpc.spec.domain)?;

        let object = world
            .get(net_id)
            .ok_or(RpcError::UnknownObject { net_id })?;
        if object.class_id() != rpc.spec.class_id {
            return Err(RpcError::WrongClass {
                rpc_id,
                expected: rpc.spec.class_id,
                actual: object.class_id(),
            });
        }

        let (bytes, references) = Self::encode_args(rpc, args)?;
        Ok(PreparedRpc {
            domain: rpc.spec.domain,
            owner: object.owner(),
            rpc: OutgoingRpc {
                net_id,
                rpc_id,
                args: bytes,
                references,
            },
        })
    }

    pub fn recipients<I>(&self, prepared: &PreparedRpc, connections: I) -> Vec<ConnectionId>
    where
        I: IntoIterator<Item = ConnectionId>,
    {
        let connections = connections.into_iter();
        match prepared.domain {
            // a subordinate holds exactly one connection, to the authority
            RpcDomain::Server | RpcDomain::Multicast => connections.collect(),
            RpcDomain::Owner => connections
                .filter(|connection| Some(*connection) == prepared.owner)
                .collect(),
            RpcDomain::MulticastExcludeOwner => connections
                .filter(|connection| Some(*connection) != prepared.owner)
                .collect(),
        }
    }

    pub fn encode_args(rpc: &ResolvedRpc, args: &[FieldValue]) -> Result<(Vec<u8>, Vec<NetId>), RpcError> {
        let rpc_id = rpc.spec.rpc_id;
        if args.len() != rpc.params.len() {
            return Err(RpcError::ArgumentCount {
                rpc_id,
                expected: rpc.params.len(),
                actual: args.len(),
            });
        }

        let mut writer = BitWriter::new();
        let mut references = Vec::new();
        for (index, (serde, arg)) in rpc.params.iter().zip(args).enumerate() {
            if !serde.accepts(arg) {
                return Err(RpcError::ArgumentType { rpc_id, index });
            }
            serde
                .ser(arg, &mut writer)
                .map_err(|_| RpcError::ArgumentType { rpc_id, index })?;
            if let Some(referent) = arg.as_reference() {
                references.push(referent);
            }
        }
        Ok((writer.to_bytes(), references))
    }

    pub fn decode_args(rpc: &ResolvedRpc, bytes: &[u8]) -> Result<Vec<FieldValue>, SerdeErr> {
        let mut reader = BitReader::new(bytes);
        let mut args = Vec::with_capacity(rpc.params.len());
        for serde in &rpc.params {
            args.push(serde.de(&mut reader)?);
        }
        if reader.bits_remaining() >= 8 {
            return Err(SerdeErr);
        }
        Ok(args)
    }
}
