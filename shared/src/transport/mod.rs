pub mod error;
pub mod loopback;

use error::TransportError;

/// An ordered, reliable packet pipe to one remote peer
pub trait Transport: Send {
    fn send(&mut self, packet: &[u8]) -> Result<(), TransportError>;

    /// Receives the next packet, if one has arrived
    fn receive(&mut self) -> Result<Option<Vec<u8>>, TransportError>;
}
