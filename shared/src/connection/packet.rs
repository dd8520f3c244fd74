use log::warn;

use crate::{
    connection::{
        chunk::ChunkKind,
        error::{ChannelError, ProtocolViolation},
    },
    constants::{CHUNK_HEADER_BYTES, MAX_CHUNK_BODY_BYTES, PACKET_HEADER_BYTES},
};

/// Packs chunk frames into length-prefixed packets no larger than the
/// configured maximum.
///
/// Packet: `length:u32 LE` + frames. Frame: `kind:u8`, `length:u16 LE`, body.
pub struct PacketWriter {
    max_bytes: usize,
    current: Vec<u8>,
    packets: Vec<Vec<u8>>,
}

impl PacketWriter {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            current: Vec::new(),
            packets: Vec::new(),
        }
    }

    pub fn write_chunk(&mut self, kind: ChunkKind, body: &[u8]) -> Result<(), ChannelError> {
        if body.len() > MAX_CHUNK_BODY_BYTES {
            return Err(ChannelError::ChunkTooLarge { bytes: body.len() });
        }
        let frame_bytes = CHUNK_HEADER_BYTES + body.len();

        if !self.current.is_empty()
            && PACKET_HEADER_BYTES + self.current.len() + frame_bytes > self.max_bytes
        {
            self.finish_packet();
        }
        if PACKET_HEADER_BYTES + frame_bytes > self.max_bytes {
            warn!(
                "{:?} chunk of {} bytes exceeds the {} byte packet limit, sending it alone",
                kind,
                body.len(),
                self.max_bytes
            );
        }

        self.current.push(kind.to_u8());
        // bounded by MAX_CHUNK_BODY_BYTES above
        self.current
            .extend_from_slice(&(body.len() as u16).to_le_bytes());
        self.current.extend_from_slice(body);
        Ok(())
    }

    fn finish_packet(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let frames = std::mem::take(&mut self.current);
        let mut packet = Vec::with_capacity(PACKET_HEADER_BYTES + frames.len());
        packet.extend_from_slice(&(frames.len() as u32).to_le_bytes());
        packet.extend_from_slice(&frames);
        self.packets.push(packet);
    }

    /// Number of chunks-carrying packets produced so far, including a
    /// partially filled one
    pub fn packet_count(&self) -> usize {
        self.packets.len() + usize::from(!self.current.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.packet_count() == 0
    }

    /// Flushes a non-empty trailing packet and returns every packet
    pub fn finish(mut self) -> Vec<Vec<u8>> {
        self.finish_packet();
        self.packets
    }
}

/// Walks the frames of one packet.
pub struct PacketReader<'a> {
    frames: &'a [u8],
    offset: usize,
}

impl<'a> PacketReader<'a> {
    pub fn new(packet: &'a [u8]) -> Result<Self, ProtocolViolation> {
        let Some((header, frames)) = packet.split_first_chunk::<PACKET_HEADER_BYTES>() else {
            return Err(ProtocolViolation::PacketLengthMismatch {
                declared: 0,
                actual: packet.len(),
            });
        };
        let declared = u32::from_le_bytes(*header) as usize;
        if declared != frames.len() {
            return Err(ProtocolViolation::PacketLengthMismatch {
                declared,
                actual: frames.len(),
            });
        }
        Ok(Self { frames, offset: 0 })
    }

    pub fn next_chunk(&mut self) -> Result<Option<(ChunkKind, &'a [u8])>, ProtocolViolation> {
        let remaining = &self.frames[self.offset..];
        if remaining.is_empty() {
            return Ok(None);
        }
        let Some((&[kind, low, high], rest)) = remaining.split_first_chunk::<CHUNK_HEADER_BYTES>() else {
            return Err(ProtocolViolation::PacketLengthMismatch {
                declared: self.frames.len(),
                actual: self.offset,
            });
        };
        let kind = ChunkKind::from_u8(kind).ok_or(ProtocolViolation::UnknownChunkKind { kind })?;
        let length = usize::from(u16::from_le_bytes([low, high]));
        if length > rest.len() {
            return Err(ProtocolViolation::ChunkLengthMismatch {
                kind,
                declared: length,
                unread_bits: (length - rest.len()) * 8,
            });
        }
        self.offset += CHUNK_HEADER_BYTES + length;
        Ok(Some((kind, &rest[..length])))
    }
}
