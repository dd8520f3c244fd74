use std::{collections::BTreeMap, sync::Arc};

use log::{info, warn};

use tether_shared::{
    ChannelEvent, ConnectionId, DisconnectReason, FieldValue, HostType, LevelId, NetId,
    ObjectWorld, Protocol, ReplicationChannel, RpcDelivery, RpcId, RpcRouter, Transport,
};

use crate::{connection::Connection, ServerConfig, ServerEvent, TetherServerError};

/// The authority of a replication session.
///
/// Owns the replicated world and one channel per accepted client. Every
/// `tick` reads what the clients sent, tells each channel what was
/// destroyed, then runs the channels' send sweeps one after another.
pub struct Server {
    config: ServerConfig,
    world: ObjectWorld,
    router: RpcRouter,
    connections: BTreeMap<ConnectionId, Connection>,
    next_connection: u64,
    level: LevelId,
    events: Vec<ServerEvent>,
}

impl Server {
    /// Create a new Server
    pub fn new(config: ServerConfig, protocol: Arc<Protocol>) -> Self {
        let level = config.initial_level;
        Self {
            config,
            world: ObjectWorld::new(protocol.clone(), HostType::Server),
            router: RpcRouter::new(protocol, HostType::Server),
            connections: BTreeMap::new(),
            next_connection: 0,
            level,
            events: Vec::new(),
        }
    }

    pub fn world(&self) -> &ObjectWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut ObjectWorld {
        &mut self.world
    }

    pub fn level(&self) -> LevelId {
        self.level
    }

    // Connections

    /// Starts replicating to a client reachable through `transport`. The
    /// client is told to load the current level first.
    pub fn accept<T: Transport + 'static>(&mut self, transport: T) -> ConnectionId {
        let connection = ConnectionId(self.next_connection);
        self.next_connection += 1;

        let mut channel = ReplicationChannel::new(
            self.world.protocol().clone(),
            self.config.channel.clone(),
            HostType::Server,
            connection,
        );
        channel.begin_travel(self.level);
        self.connections
            .insert(connection, Connection::new(channel, Box::new(transport)));
        self.events.push(ServerEvent::Connected(connection));
        info!("Accepted connection {:?}", connection);
        connection
    }

    pub fn disconnect(&mut self, connection: ConnectionId) -> Result<(), TetherServerError> {
        if !self.connections.contains_key(&connection) {
            return Err(TetherServerError::UnknownConnection { connection });
        }
        self.drop_connection(connection, DisconnectReason::Manual);
        Ok(())
    }

    pub fn connections(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.connections.keys().copied()
    }

    pub fn channel(&self, connection: ConnectionId) -> Option<&ReplicationChannel> {
        self.connections
            .get(&connection)
            .map(|connection| &connection.channel)
    }

    fn drop_connection(&mut self, connection: ConnectionId, reason: DisconnectReason) {
        let Some(mut dropped) = self.connections.remove(&connection) else {
            return;
        };
        dropped.channel.tear_down();
        info!("Connection {:?} dropped: {:?}", connection, reason);
        self.events
            .push(ServerEvent::Disconnected { connection, reason });
    }

    // Levels

    /// Moves every client to `level`. Objects destroyed while a client is
    /// still loading are reported to it once it has caught up.
    pub fn begin_travel(&mut self, level: LevelId) {
        self.level = level;
        for connection in self.connections.values_mut() {
            connection.channel.begin_travel(level);
        }
    }

    // Replication

    /// The next tick re-sends every eligible field on every channel
    pub fn request_flush(&mut self) {
        for connection in self.connections.values_mut() {
            connection.channel.request_flush();
        }
    }

    /// Sends an RPC on an object to the recipients its domain names.
    ///
    /// Returns how each recipient's channel handled it; policy drops are
    /// not errors.
    pub fn invoke(
        &mut self,
        net_id: NetId,
        rpc_id: RpcId,
        args: &[FieldValue],
    ) -> Result<Vec<(ConnectionId, RpcDelivery)>, TetherServerError> {
        let prepared = self.router.prepare(&self.world, net_id, rpc_id, args)?;
        let recipients = self
            .router
            .recipients(&prepared, self.connections.keys().copied());

        let mut deliveries = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            if let Some(connection) = self.connections.get_mut(&recipient) {
                let delivery = connection
                    .channel
                    .queue_rpc(&self.world, prepared.rpc.clone());
                deliveries.push((recipient, delivery));
            }
        }
        Ok(deliveries)
    }

    /// Must be called regularly: reads every client's packets, then writes
    /// this tick's replication traffic
    pub fn tick(&mut self, dt: f32) {
        let mut dropped = Vec::new();

        for (id, connection) in self.connections.iter_mut() {
            match connection.receive(&mut self.world) {
                Ok(events) => {
                    for event in events {
                        match event {
                            ChannelEvent::Rpc(rpc) => self.events.push(ServerEvent::Rpc(rpc)),
                            ChannelEvent::Synced(level) => self.events.push(ServerEvent::Synced {
                                connection: *id,
                                level,
                            }),
                            _ => {}
                        }
                    }
                }
                Err(reason) => dropped.push((*id, reason)),
            }
        }
        for (id, reason) in dropped.drain(..) {
            self.drop_connection(id, reason);
        }

        for net_id in self.world.take_destroyed() {
            for connection in self.connections.values_mut() {
                connection.channel.notify_destroyed(net_id);
            }
        }

        for (id, connection) in self.connections.iter_mut() {
            if let Err(reason) = connection.send(&self.world, dt) {
                dropped.push((*id, reason));
                continue;
            }
            if connection.channel.is_timed_out() {
                warn!("Connection {:?} timed out", id);
                dropped.push((*id, DisconnectReason::Timeout));
            }
        }
        for (id, reason) in dropped {
            self.drop_connection(id, reason);
        }
    }

    pub fn take_events(&mut self) -> Vec<ServerEvent> {
        std::mem::take(&mut self.events)
    }
}
