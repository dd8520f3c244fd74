use std::sync::{Arc, Mutex};

use tether_shared::{Transport, TransportError};

/// Every packet one end of a connection has sent, shared with the test
#[derive(Clone, Default)]
pub struct PacketLog {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl PacketLog {
    pub fn packets(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }

    pub fn byte_count(&self) -> usize {
        self.sent.lock().unwrap().iter().map(Vec::len).sum()
    }

    /// Forgets what was recorded so far
    pub fn take(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }
}

/// Forwards to an inner transport and records every packet sent through it
pub struct RecordingTransport<T: Transport> {
    inner: T,
    log: PacketLog,
}

impl<T: Transport> RecordingTransport<T> {
    pub fn new(inner: T) -> (Self, PacketLog) {
        let log = PacketLog::default();
        (
            Self {
                inner,
                log: log.clone(),
            },
            log,
        )
    }
}

impl<T: Transport> Transport for RecordingTransport<T> {
    fn send(&mut self, packet: &[u8]) -> Result<(), TransportError> {
        self.inner.send(packet)?;
        self.log
            .sent
            .lock()
            .map_err(|_| TransportError::Poisoned)?
            .push(packet.to_vec());
        Ok(())
    }

    fn receive(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        self.inner.receive()
    }
}
