use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use super::{error::TransportError, Transport};

#[derive(Default)]
struct Pipe {
    packets: VecDeque<Vec<u8>>,
    closed: bool,
    bytes: usize,
}

type SharedPipe = Arc<Mutex<Pipe>>;

/// In-process transport: two ends joined by a pair of queues
pub struct LoopbackTransport {
    outgoing: SharedPipe,
    incoming: SharedPipe,
}

impl LoopbackTransport {
    pub fn pair() -> (Self, Self) {
        let a_to_b = SharedPipe::default();
        let b_to_a = SharedPipe::default();
        (
            Self {
                outgoing: a_to_b.clone(),
                incoming: b_to_a.clone(),
            },
            Self {
                outgoing: b_to_a,
                incoming: a_to_b,
            },
        )
    }

    /// Closes both directions; the other end sees `Closed` once it has
    /// drained what was already sent
    pub fn close(&self) {
        for pipe in [&self.outgoing, &self.incoming] {
            if let Ok(mut pipe) = pipe.lock() {
                pipe.closed = true;
            }
        }
    }

    /// Total bytes this end has sent
    pub fn sent_bytes(&self) -> Result<usize, TransportError> {
        let pipe = self.outgoing.lock().map_err(|_| TransportError::Poisoned)?;
        Ok(pipe.bytes)
    }
}

impl Transport for LoopbackTransport {
    fn send(&mut self, packet: &[u8]) -> Result<(), TransportError> {
        let mut pipe = self.outgoing.lock().map_err(|_| TransportError::Poisoned)?;
        if pipe.closed {
            return Err(TransportError::Closed);
        }
        pipe.bytes += packet.len();
        pipe.packets.push_back(packet.to_vec());
        Ok(())
    }

    fn receive(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut pipe = self.incoming.lock().map_err(|_| TransportError::Poisoned)?;
        match pipe.packets.pop_front() {
            Some(packet) => Ok(Some(packet)),
            None if pipe.closed => Err(TransportError::Closed),
            None => Ok(None),
        }
    }
}
