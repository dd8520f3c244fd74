use crate::types::NetId;

/// Default upper bound on the size of one outgoing packet, in bytes
pub const MAX_PACKET_BYTES: usize = 8192;

/// The presence bitmap length is carried in a u8
pub const MAX_FIELD_COUNT: usize = u8::MAX as usize;

/// Largest chunk body a frame header can describe
pub const MAX_CHUNK_BODY_BYTES: usize = u16::MAX as usize;

/// Written in place of an outer id when an object has none
pub const NO_OUTER: NetId = NetId::MAX;

/// Bytes taken by a packet's length prefix
pub const PACKET_HEADER_BYTES: usize = 4;

/// Bytes taken by a chunk's kind + length prefix
pub const CHUNK_HEADER_BYTES: usize = 3;
