use log::warn;

use tether_shared::{
    ChannelEvent, DisconnectReason, ObjectWorld, ReplicationChannel, Transport, TransportError,
};

/// A client's transport together with its replication channel
pub struct Connection {
    pub channel: ReplicationChannel,
    transport: Box<dyn Transport>,
}

impl Connection {
    pub fn new(channel: ReplicationChannel, transport: Box<dyn Transport>) -> Self {
        Self { channel, transport }
    }

    /// Reads every packet that has arrived. Returns the reason to drop the
    /// connection, if reading failed.
    pub fn receive(&mut self, world: &mut ObjectWorld) -> Result<Vec<ChannelEvent>, DisconnectReason> {
        loop {
            match self.transport.receive() {
                Ok(Some(packet)) => {
                    if let Err(error) = self.channel.receive_packet(world, &packet) {
                        warn!(
                            "Dropping connection {:?}: {}",
                            self.channel.connection(),
                            error
                        );
                        return Err(DisconnectReason::Channel(error));
                    }
                }
                Ok(None) => break,
                Err(error) => return Err(transport_reason(error)),
            }
        }
        Ok(self.channel.take_events())
    }

    /// Runs the channel's send sweep and pushes the packets out
    pub fn send(&mut self, world: &ObjectWorld, dt: f32) -> Result<(), DisconnectReason> {
        let packets = self
            .channel
            .send_packets(world, dt)
            .map_err(DisconnectReason::Channel)?;
        for packet in packets {
            self.transport.send(&packet).map_err(transport_reason)?;
        }
        Ok(())
    }
}

fn transport_reason(error: TransportError) -> DisconnectReason {
    match error {
        TransportError::Closed | TransportError::Poisoned => DisconnectReason::TransportClosed,
    }
}
