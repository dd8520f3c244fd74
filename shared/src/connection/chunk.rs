use tether_serde::{BitReader, BitWrite, BitWriter, Serde, SerdeErr};

use crate::{
    connection::error::ProtocolViolation,
    constants::NO_OUTER,
    types::{ClassId, NetId, RpcId},
};

/// The kind byte at the start of every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChunkKind {
    ObjectData = 0,
    Rpc = 1,
    Ping = 2,
    Pong = 3,
    Destroy = 4,
    /// Subordinate -> authority: the named level is loaded
    Handshake = 5,
    /// Authority -> subordinate: load the named level
    Travel = 6,
}

impl ChunkKind {
    pub fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => ChunkKind::ObjectData,
            1 => ChunkKind::Rpc,
            2 => ChunkKind::Ping,
            3 => ChunkKind::Pong,
            4 => ChunkKind::Destroy,
            5 => ChunkKind::Handshake,
            6 => ChunkKind::Travel,
            _ => return None,
        })
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Present on the first chunk an object sends on a channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreateInfo {
    pub outer: Option<NetId>,
    pub class_id: ClassId,
}

/// Leading part of an object-data chunk; the field bitmap follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectHeader {
    pub net_id: NetId,
    pub create: Option<CreateInfo>,
    pub relevant: bool,
    pub tear_off: bool,
}

impl ObjectHeader {
    pub fn ser(&self, writer: &mut dyn BitWrite) {
        self.net_id.ser(writer);
        writer.write_bit(self.create.is_some());
        writer.write_bit(self.relevant);
        writer.write_bit(self.tear_off);
        if let Some(create) = &self.create {
            create.outer.unwrap_or(NO_OUTER).ser(writer);
            create.class_id.ser(writer);
        }
    }

    pub fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let net_id = NetId::de(reader)?;
        let is_create = reader.read_bit()?;
        let relevant = reader.read_bit()?;
        let tear_off = reader.read_bit()?;
        let create = if is_create {
            let outer = NetId::de(reader)?;
            let class_id = ClassId::de(reader)?;
            Some(CreateInfo {
                outer: (outer != NO_OUTER).then_some(outer),
                class_id,
            })
        } else {
            None
        };
        Ok(Self {
            net_id,
            create,
            relevant,
            tear_off,
        })
    }
}

/// Network ids travel as i32 in RPC and destroy chunks
pub fn net_id_from_wire(value: i32) -> Result<NetId, ProtocolViolation> {
    match NetId::try_from(value) {
        Ok(net_id) if net_id != NO_OUTER => Ok(net_id),
        _ => Err(ProtocolViolation::NetIdOutOfRange {
            net_id: i64::from(value),
        }),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcChunk {
    pub net_id: NetId,
    pub rpc_id: RpcId,
    pub args: Vec<u8>,
}

impl RpcChunk {
    pub fn to_body(&self) -> Vec<u8> {
        let mut writer = BitWriter::new();
        i32::from(self.net_id).ser(&mut writer);
        self.rpc_id.ser(&mut writer);
        // the frame length already bounds this below i32::MAX
        (self.args.len() as i32).ser(&mut writer);
        writer.write_bytes(&self.args);
        writer.to_bytes()
    }

    pub fn from_body(body: &[u8]) -> Result<Self, ProtocolViolation> {
        let (net_id, rpc_id, args) = read_exact(ChunkKind::Rpc, body, |reader| {
            let net_id = i32::de(reader)?;
            let rpc_id = RpcId::de(reader)?;
            let length = usize::try_from(i32::de(reader)?).map_err(|_| SerdeErr)?;
            let args = reader.read_bytes(length)?;
            Ok((net_id, rpc_id, args))
        })?;
        Ok(Self {
            net_id: net_id_from_wire(net_id)?,
            rpc_id,
            args,
        })
    }
}

pub fn destroy_body(net_id: NetId) -> Vec<u8> {
    let mut writer = BitWriter::new();
    i32::from(net_id).ser(&mut writer);
    writer.to_bytes()
}

pub fn read_destroy(body: &[u8]) -> Result<NetId, ProtocolViolation> {
    let net_id = read_exact(ChunkKind::Destroy, body, i32::de)?;
    net_id_from_wire(net_id)
}

/// Body of ping, pong, handshake and travel chunks
pub fn u32_body(value: u32) -> Vec<u8> {
    value.to_le_bytes().to_vec()
}

pub fn read_u32(kind: ChunkKind, body: &[u8]) -> Result<u32, ProtocolViolation> {
    read_exact(kind, body, u32::de)
}

/// Decodes a chunk body, requiring the decoder to consume it completely
/// (up to the zero padding of the last byte).
pub fn read_exact<T>(
    kind: ChunkKind,
    body: &[u8],
    decode: impl FnOnce(&mut BitReader) -> Result<T, SerdeErr>,
) -> Result<T, ProtocolViolation> {
    let mut reader = BitReader::new(body);
    let value = decode(&mut reader).map_err(|_| ProtocolViolation::MalformedChunk { kind })?;
    check_consumed(kind, body, &reader)?;
    Ok(value)
}

pub fn check_consumed(kind: ChunkKind, body: &[u8], reader: &BitReader) -> Result<(), ProtocolViolation> {
    let unread_bits = reader.bits_remaining();
    if unread_bits >= 8 {
        return Err(ProtocolViolation::ChunkLengthMismatch {
            kind,
            declared: body.len(),
            unread_bits,
        });
    }
    Ok(())
}
