use std::sync::Arc;

use log::{info, warn};

use tether_shared::{
    ConnectionId, DisconnectReason, FieldValue, HostType, LevelId, NetId, ObjectWorld, Protocol,
    ReplicationChannel, RpcDelivery, RpcId, RpcRouter, Transport, TransportError,
};

use crate::{ClientConfig, ClientEvent, TetherClientError};

/// The server as seen from this side of a connection
const SERVER: ConnectionId = ConnectionId(0);

/// A subordinate peer: mirrors the objects the server replicates to it.
pub struct Client {
    world: ObjectWorld,
    router: RpcRouter,
    channel: ReplicationChannel,
    transport: Box<dyn Transport>,
    connected: bool,
    events: Vec<ClientEvent>,
}

impl Client {
    /// Create a new Client talking to the server through `transport`
    pub fn new<T: Transport + 'static>(config: ClientConfig, protocol: Arc<Protocol>, transport: T) -> Self {
        Self {
            world: ObjectWorld::new(protocol.clone(), HostType::Client),
            router: RpcRouter::new(protocol.clone(), HostType::Client),
            channel: ReplicationChannel::new(protocol, config.channel, HostType::Client, SERVER),
            transport: Box::new(transport),
            connected: true,
            events: Vec::new(),
        }
    }

    /// Shadow copies of the replicated objects
    pub fn world(&self) -> &ObjectWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut ObjectWorld {
        &mut self.world
    }

    pub fn channel(&self) -> &ReplicationChannel {
        &self.channel
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Tells the server `level` is loaded. Replication resumes once the
    /// server sees it matches its own level.
    pub fn finish_loading(&mut self, level: LevelId) {
        self.channel.report_loaded_level(level);
    }

    /// Queues a `Server` RPC on a replicated object
    pub fn invoke(
        &mut self,
        net_id: NetId,
        rpc_id: RpcId,
        args: &[FieldValue],
    ) -> Result<RpcDelivery, TetherClientError> {
        if !self.connected {
            return Err(TetherClientError::Disconnected);
        }
        let prepared = self.router.prepare(&self.world, net_id, rpc_id, args)?;
        Ok(self.channel.queue_rpc(&self.world, prepared.rpc))
    }

    /// Must be called regularly: applies what the server sent, then sends
    /// pings, handshakes and queued RPCs
    pub fn tick(&mut self, dt: f32) {
        if !self.connected {
            return;
        }
        if let Err(reason) = self.receive() {
            self.disconnect(reason);
            return;
        }
        self.channel.expire_pending_references(&mut self.world);

        if let Err(reason) = self.send(dt) {
            self.disconnect(reason);
            return;
        }
        if self.channel.is_timed_out() {
            warn!("Connection to the server timed out");
            self.disconnect(DisconnectReason::Timeout);
        }
    }

    pub fn take_events(&mut self) -> Vec<ClientEvent> {
        std::mem::take(&mut self.events)
    }

    fn receive(&mut self) -> Result<(), DisconnectReason> {
        while let Some(packet) = self.transport.receive().map_err(transport_reason)? {
            if let Err(error) = self.channel.receive_packet(&mut self.world, &packet) {
                warn!("Server sent an invalid packet: {}", error);
                return Err(DisconnectReason::Channel(error));
            }
        }
        self.events
            .extend(self.channel.take_events().into_iter().map(ClientEvent::from));
        Ok(())
    }

    fn send(&mut self, dt: f32) -> Result<(), DisconnectReason> {
        let packets = self
            .channel
            .send_packets(&self.world, dt)
            .map_err(DisconnectReason::Channel)?;
        for packet in packets {
            self.transport.send(&packet).map_err(transport_reason)?;
        }
        Ok(())
    }

    fn disconnect(&mut self, reason: DisconnectReason) {
        self.connected = false;
        self.channel.tear_down();
        info!("Disconnected from the server: {:?}", reason);
        self.events.push(ClientEvent::Disconnected(reason));
    }
}

fn transport_reason(error: TransportError) -> DisconnectReason {
    match error {
        TransportError::Closed | TransportError::Poisoned => DisconnectReason::TransportClosed,
    }
}
