use std::{
    collections::{BTreeMap, BTreeSet, HashSet, VecDeque},
    sync::Arc,
};

use log::{debug, info, warn};
use tether_serde::{BitReader, BitWriter};

use crate::{
    connection::{
        channel_config::ChannelConfig,
        channel_event::{ChannelEvent, IncomingRpc},
        channel_state::ChannelState,
        chunk::{
            check_consumed, destroy_body, read_destroy, read_u32, u32_body, ChunkKind, CreateInfo,
            ObjectHeader, RpcChunk,
        },
        error::{ChannelError, ProtocolViolation},
        packet::{PacketReader, PacketWriter},
        ping_manager::{round_trip_ms, timestamp_ms, PingManager},
    },
    protocol::Protocol,
    replication::{
        dependency_resolver::{DependencyQueue, PendingReferences},
        object_replicator::ObjectReplicator,
    },
    rpc::rpc_router::{OutgoingRpc, RpcRouter},
    schema::field_value::FieldValue,
    types::{ConnectionId, HostType, LevelId, NetId},
    world::object_world::{NetObject, ObjectWorld},
};

/// Why a call was skipped instead of sent
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// The remote peer has never been sent the target object
    NotReplicated,
    TornOff,
    HandshakeIncomplete,
    /// The remote peer is on another level
    LevelMismatch,
    ChannelClosed,
}

/// Outcome of queueing a call on a channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RpcDelivery {
    Queued,
    Dropped(DropReason),
}

/// Replication session with one remote peer.
///
/// On the authority it owns one [`ObjectReplicator`] per object the peer
/// has been sent and runs the per-tick send sweep. On a subordinate it owns
/// the replicators of the shadows it created and applies incoming chunks.
/// Both sides exchange pings, level handshakes and RPCs.
pub struct ReplicationChannel {
    connection: ConnectionId,
    host_type: HostType,
    protocol: Arc<Protocol>,
    config: ChannelConfig,
    state: ChannelState,

    replicators: BTreeMap<NetId, ObjectReplicator>,
    torn_off: BTreeSet<NetId>,
    dependencies: DependencyQueue,
    pending: PendingReferences,
    creating: HashSet<NetId>,

    garbage: BTreeSet<NetId>,
    destroy_queue: Vec<NetId>,
    rpc_queue: VecDeque<OutgoingRpc>,
    control: Vec<(ChunkKind, Vec<u8>)>,
    flush_requested: bool,
    travel_completed: bool,

    local_level: LevelId,
    remote_level: Option<LevelId>,

    ping: PingManager,
    clock: f64,
    last_heard: f64,

    events: Vec<ChannelEvent>,
}

impl ReplicationChannel {
    pub fn new(
        protocol: Arc<Protocol>,
        config: ChannelConfig,
        host_type: HostType,
        connection: ConnectionId,
    ) -> Self {
        let ping = PingManager::new(config.ping_interval, config.rtt_sample_count);
        Self {
            connection,
            host_type,
            protocol,
            config,
            state: ChannelState::Handshaking,
            replicators: BTreeMap::new(),
            torn_off: BTreeSet::new(),
            dependencies: DependencyQueue::new(),
            pending: PendingReferences::new(),
            creating: HashSet::new(),
            garbage: BTreeSet::new(),
            destroy_queue: Vec::new(),
            rpc_queue: VecDeque::new(),
            control: Vec::new(),
            flush_requested: false,
            travel_completed: false,
            local_level: 0,
            remote_level: None,
            ping,
            clock: 0.0,
            last_heard: 0.0,
            events: Vec::new(),
        }
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    pub fn host_type(&self) -> HostType {
        self.host_type
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn local_level(&self) -> LevelId {
        self.local_level
    }

    pub fn remote_level(&self) -> Option<LevelId> {
        self.remote_level
    }

    /// Whether the remote peer has been sent (or has sent) this object
    pub fn has_replicator(&self, net_id: NetId) -> bool {
        self.replicators.contains_key(&net_id)
    }

    pub fn replicator(&self, net_id: NetId) -> Option<&ObjectReplicator> {
        self.replicators.get(&net_id)
    }

    pub fn replicator_count(&self) -> usize {
        self.replicators.len()
    }

    pub fn is_torn_off(&self, net_id: NetId) -> bool {
        self.torn_off.contains(&net_id)
    }

    /// Received reference fields still waiting on their referent
    pub fn pending_reference_count(&self) -> usize {
        self.pending.len()
    }

    /// Destroyed ids held back until the current travel completes
    pub fn garbage_len(&self) -> usize {
        self.garbage.len()
    }

    pub fn average_rtt(&self) -> Option<f32> {
        self.ping.average_rtt()
    }

    pub fn take_events(&mut self) -> Vec<ChannelEvent> {
        std::mem::take(&mut self.events)
    }

    // Lifecycle

    /// Authority: moves the remote peer to `level`. Object sends pause until
    /// the peer reports it has loaded it.
    pub fn begin_travel(&mut self, level: LevelId) {
        if self.state.is_torn_down() {
            return;
        }
        self.local_level = level;
        if self.state != ChannelState::Handshaking {
            self.state = ChannelState::Traveling;
        }
        self.control.push((ChunkKind::Travel, u32_body(level)));
        info!("Connection {:?} traveling to level {}", self.connection, level);
    }

    /// Subordinate: reports that `level` has finished loading
    pub fn report_loaded_level(&mut self, level: LevelId) {
        if self.state.is_torn_down() {
            return;
        }
        self.local_level = level;
        self.control.push((ChunkKind::Handshake, u32_body(level)));
        if self.remote_level == Some(level) {
            self.state = ChannelState::Synced;
            self.events.push(ChannelEvent::Synced(level));
            info!("Connection {:?} synced on level {}", self.connection, level);
        }
    }

    /// Stops every further send and discards queued traffic
    pub fn tear_down(&mut self) {
        if self.state.is_torn_down() {
            return;
        }
        self.state = ChannelState::TornDown;
        self.control.clear();
        self.rpc_queue.clear();
        self.destroy_queue.clear();
        self.dependencies.finish_flush();
        info!("Connection {:?} torn down", self.connection);
    }

    /// True once nothing has been heard from the peer for longer than the
    /// configured timeout
    pub fn is_timed_out(&self) -> bool {
        self.clock - self.last_heard > f64::from(self.config.timeout)
    }

    /// The next sweep re-sends every eligible field, ignoring rates and
    /// dirty checks
    pub fn request_flush(&mut self) {
        self.flush_requested = true;
    }

    /// Authority: an object stopped being replicated. The peer is told only
    /// if it knew the object; during travel the notice waits in the garbage
    /// set.
    pub fn notify_destroyed(&mut self, net_id: NetId) {
        self.dependencies.remove(net_id);
        self.rpc_queue.retain(|rpc| rpc.net_id != net_id);
        self.creating.remove(&net_id);

        let had_replicator = self.replicators.remove(&net_id).is_some();
        let was_torn_off = self.torn_off.remove(&net_id);
        if !had_replicator && !was_torn_off {
            return;
        }
        if self.state.is_synced() {
            self.destroy_queue.push(net_id);
        } else {
            self.garbage.insert(net_id);
        }
    }

    // Rpcs

    /// Queues an encoded call, or reports why the peer must not receive it
    pub fn queue_rpc(&mut self, world: &ObjectWorld, rpc: OutgoingRpc) -> RpcDelivery {
        let delivery = self.rpc_delivery(world, rpc.net_id);
        match delivery {
            RpcDelivery::Queued => self.rpc_queue.push_back(rpc),
            RpcDelivery::Dropped(reason) => debug!(
                "Dropped RPC {} on object {} for {:?}: {:?}",
                rpc.rpc_id, rpc.net_id, self.connection, reason
            ),
        }
        delivery
    }

    fn rpc_delivery(&self, world: &ObjectWorld, net_id: NetId) -> RpcDelivery {
        let reason = match self.state {
            ChannelState::TornDown => Some(DropReason::ChannelClosed),
            ChannelState::Handshaking => Some(DropReason::HandshakeIncomplete),
            ChannelState::Traveling => Some(DropReason::LevelMismatch),
            ChannelState::Synced if self.remote_level != Some(self.local_level) => {
                Some(DropReason::LevelMismatch)
            }
            ChannelState::Synced => {
                let torn_off = self.torn_off.contains(&net_id)
                    || world.get(net_id).is_some_and(NetObject::is_torn_off);
                if torn_off {
                    Some(DropReason::TornOff)
                } else if !self.replicators.contains_key(&net_id) {
                    Some(DropReason::NotReplicated)
                } else {
                    None
                }
            }
        };
        reason.map_or(RpcDelivery::Queued, RpcDelivery::Dropped)
    }

    // Sending

    /// Advances the channel clock by `dt` and writes this tick's traffic.
    ///
    /// A torn-down channel writes nothing.
    pub fn send_packets(&mut self, world: &ObjectWorld, dt: f32) -> Result<Vec<Vec<u8>>, ChannelError> {
        if self.state.is_torn_down() {
            return Ok(Vec::new());
        }
        self.clock += f64::from(dt);

        let mut writer = PacketWriter::new(self.config.max_packet_bytes);

        if self.ping.tick(dt) {
            writer.write_chunk(ChunkKind::Ping, &u32_body(timestamp_ms(self.clock)))?;
        }
        for (kind, body) in std::mem::take(&mut self.control) {
            writer.write_chunk(kind, &body)?;
        }

        if self.host_type.is_authority() && self.state.is_synced() {
            if std::mem::take(&mut self.travel_completed) {
                self.flush_garbage(&mut writer)?;
                self.last_heard = self.clock;
            }
            for net_id in std::mem::take(&mut self.destroy_queue) {
                writer.write_chunk(ChunkKind::Destroy, &destroy_body(net_id))?;
            }
            self.sweep(world, dt, &mut writer)?;
        }

        if self.state.is_synced() {
            self.write_rpcs(world, &mut writer)?;
        }
        self.dependencies.finish_flush();

        Ok(writer.finish())
    }

    fn flush_garbage(&mut self, writer: &mut PacketWriter) -> Result<(), ChannelError> {
        if self.garbage.is_empty() {
            return Ok(());
        }
        info!(
            "Connection {:?} flushing {} deferred destroy notices",
            self.connection,
            self.garbage.len()
        );
        for net_id in std::mem::take(&mut self.garbage) {
            writer.write_chunk(ChunkKind::Destroy, &destroy_body(net_id))?;
        }
        Ok(())
    }

    fn sweep(&mut self, world: &ObjectWorld, dt: f32, writer: &mut PacketWriter) -> Result<(), ChannelError> {
        let force_flush = std::mem::take(&mut self.flush_requested);
        for (net_id, object) in world.iter() {
            self.replicate_object(world, *net_id, object, dt, force_flush, writer)?;
        }
        self.drain_dependencies(world, writer)
    }

    fn replicate_object(
        &mut self,
        world: &ObjectWorld,
        net_id: NetId,
        object: &NetObject,
        dt: f32,
        force_flush: bool,
        writer: &mut PacketWriter,
    ) -> Result<(), ChannelError> {
        let connection = self.connection;
        if !object.is_visible_to(connection) || self.torn_off.contains(&net_id) {
            return Ok(());
        }
        let relevant = object.is_relevant_to(connection);

        let Some(replicator) = self.replicators.get_mut(&net_id) else {
            if relevant && !object.is_torn_off() {
                self.create_object(world, net_id, writer)?;
            }
            return Ok(());
        };

        if object.is_torn_off() {
            let header = ObjectHeader {
                net_id,
                create: None,
                relevant: replicator.was_relevant(),
                tear_off: true,
            };
            write_header_only(writer, &header)?;
            self.replicators.remove(&net_id);
            self.torn_off.insert(net_id);
            debug!("Object {} torn off for {:?}", net_id, connection);
            return Ok(());
        }

        if replicator.update_relevancy(relevant) && !relevant {
            let header = ObjectHeader {
                net_id,
                create: None,
                relevant: false,
                tear_off: false,
            };
            return write_header_only(writer, &header);
        }
        if !relevant {
            return Ok(());
        }

        let forced = force_flush || replicator.needs_full_resend();
        let elapsed = replicator.advance_rate(dt, object.replicate_rate());
        let field_dt = match elapsed {
            Some(elapsed) => elapsed,
            None if forced => 0.0,
            None => return Ok(()),
        };

        let mut body = BitWriter::new();
        ObjectHeader {
            net_id,
            create: None,
            relevant: true,
            tear_off: false,
        }
        .ser(&mut body);

        // out of the map while writing, so references can consult it
        let Some(mut replicator) = self.replicators.remove(&net_id) else {
            return Ok(());
        };
        let mut references = Vec::new();
        let sendable = |referent: NetId| referent == net_id || self.is_reference_sendable(world, referent);
        let written = replicator.delta_serialize(
            object.instance(),
            field_dt,
            force_flush,
            &mut body,
            &sendable,
            &mut references,
        );
        self.replicators.insert(net_id, replicator);
        if written? {
            writer.write_chunk(ChunkKind::ObjectData, &body.to_bytes())?;
            self.queue_references(references);
        }
        Ok(())
    }

    /// Writes the creation chunk of an object the peer has never been sent,
    /// creating its outer first when the peer may see it
    fn create_object(&mut self, world: &ObjectWorld, net_id: NetId, writer: &mut PacketWriter) -> Result<(), ChannelError> {
        if self.replicators.contains_key(&net_id) || !self.creating.insert(net_id) {
            return Ok(());
        }
        let Some(object) = world.get(net_id) else {
            self.creating.remove(&net_id);
            return Ok(());
        };
        let connection = self.connection;

        if let Some(outer) = object.outer() {
            let outer_eligible = world
                .get(outer)
                .is_some_and(|outer| self.is_eligible(outer));
            if outer_eligible && !self.torn_off.contains(&outer) {
                self.create_object(world, outer, writer)?;
            }
        }

        let class = self.protocol.class(object.class_id())?.clone();
        let is_owner = object.owner() == Some(connection);
        let mut replicator = ObjectReplicator::new(net_id, class, is_owner);

        let mut body = BitWriter::new();
        ObjectHeader {
            net_id,
            create: Some(CreateInfo {
                outer: object
                    .outer()
                    .filter(|outer| self.replicators.contains_key(outer)),
                class_id: object.class_id(),
            }),
            relevant: true,
            tear_off: false,
        }
        .ser(&mut body);

        let mut references = Vec::new();
        let sendable = |referent: NetId| referent == net_id || self.is_reference_sendable(world, referent);
        replicator.full_serialize(object.instance(), &mut body, &sendable, &mut references)?;
        writer.write_chunk(ChunkKind::ObjectData, &body.to_bytes())?;
        debug!("Created object {} for {:?}", net_id, connection);

        self.replicators.insert(net_id, replicator);
        self.creating.remove(&net_id);
        self.queue_references(references);
        Ok(())
    }

    fn is_eligible(&self, object: &NetObject) -> bool {
        object.is_visible_to(self.connection) && object.is_relevant_to(self.connection) && !object.is_torn_off()
    }

    /// A reference may be written only if the peer already holds its
    /// referent, or the dependency drain will create it in this flush
    fn is_reference_sendable(&self, world: &ObjectWorld, referent: NetId) -> bool {
        if self.replicators.contains_key(&referent) || self.torn_off.contains(&referent) {
            return true;
        }
        world.get(referent).is_some_and(|object| self.is_eligible(object))
    }

    fn queue_references(&mut self, references: Vec<NetId>) {
        for referent in references {
            if !self.replicators.contains_key(&referent) {
                self.dependencies.push(referent);
            }
        }
    }

    /// Creates every referenced object the peer lacks, batch by batch, until
    /// no new references turn up
    fn drain_dependencies(&mut self, world: &ObjectWorld, writer: &mut PacketWriter) -> Result<(), ChannelError> {
        while !self.dependencies.is_empty() {
            for net_id in self.dependencies.next_batch() {
                if self.replicators.contains_key(&net_id) || self.torn_off.contains(&net_id) {
                    continue;
                }
                let Some(object) = world.get(net_id) else {
                    continue;
                };
                if self.is_eligible(object) {
                    self.create_object(world, net_id, writer)?;
                }
            }
        }
        Ok(())
    }

    fn write_rpcs(&mut self, world: &ObjectWorld, writer: &mut PacketWriter) -> Result<(), ChannelError> {
        while let Some(rpc) = self.rpc_queue.pop_front() {
            if !self.replicators.contains_key(&rpc.net_id) {
                debug!("Dropped RPC {} on object {} that left the channel", rpc.rpc_id, rpc.net_id);
                continue;
            }
            let rpc = if self.host_type.is_authority() {
                let Some(rpc) = self.hide_unsendable_arguments(world, rpc) else {
                    continue;
                };
                self.queue_references(rpc.references.clone());
                self.drain_dependencies(world, writer)?;
                rpc
            } else {
                rpc
            };
            let chunk = RpcChunk {
                net_id: rpc.net_id,
                rpc_id: rpc.rpc_id,
                args: rpc.args,
            };
            writer.write_chunk(ChunkKind::Rpc, &chunk.to_body())?;
        }
        Ok(())
    }

    /// Nulls every argument referencing an object this peer must not see.
    /// Returns `None` if the call can no longer be re-encoded.
    fn hide_unsendable_arguments(&self, world: &ObjectWorld, rpc: OutgoingRpc) -> Option<OutgoingRpc> {
        if rpc
            .references
            .iter()
            .all(|referent| self.is_reference_sendable(world, *referent))
        {
            return Some(rpc);
        }
        let spec = self.protocol.rpc(rpc.rpc_id)?;
        let Ok(mut args) = RpcRouter::decode_args(spec, &rpc.args) else {
            warn!("Dropped RPC {} whose arguments could not be decoded", rpc.rpc_id);
            return None;
        };
        for arg in &mut args {
            if let FieldValue::Reference(Some(referent)) = arg {
                if !self.is_reference_sendable(world, *referent) {
                    *arg = FieldValue::Reference(None);
                }
            }
        }
        match RpcRouter::encode_args(spec, &args) {
            Ok((bytes, references)) => Some(OutgoingRpc {
                args: bytes,
                references,
                ..rpc
            }),
            Err(error) => {
                warn!("Dropped RPC {}: {}", rpc.rpc_id, error);
                None
            }
        }
    }

    // Receiving

    /// Reads one packet from the peer. Any error is fatal for the channel.
    pub fn receive_packet(&mut self, world: &mut ObjectWorld, packet: &[u8]) -> Result<(), ChannelError> {
        if self.state.is_torn_down() {
            return Ok(());
        }
        let mut reader = PacketReader::new(packet)?;
        while let Some((kind, body)) = reader.next_chunk()? {
            self.receive_chunk(world, kind, body)?;
        }
        Ok(())
    }

    fn receive_chunk(&mut self, world: &mut ObjectWorld, kind: ChunkKind, body: &[u8]) -> Result<(), ChannelError> {
        match kind {
            ChunkKind::Ping => {
                read_u32(kind, body)?;
                self.control.push((ChunkKind::Pong, body.to_vec()));
                self.last_heard = self.clock;
            }
            ChunkKind::Pong => {
                let sent = read_u32(kind, body)?;
                self.ping.record(round_trip_ms(sent, timestamp_ms(self.clock)));
                self.last_heard = self.clock;
            }
            ChunkKind::Handshake => {
                self.expect_authority(kind)?;
                let level = read_u32(kind, body)?;
                self.receive_handshake(level);
            }
            ChunkKind::Travel => {
                self.expect_subordinate(kind)?;
                let level = read_u32(kind, body)?;
                self.remote_level = Some(level);
                self.state = ChannelState::Traveling;
                self.events.push(ChannelEvent::TravelRequested(level));
            }
            ChunkKind::ObjectData => {
                self.expect_subordinate(kind)?;
                self.receive_object(world, body)?;
            }
            ChunkKind::Destroy => {
                self.expect_subordinate(kind)?;
                let net_id = read_destroy(body)?;
                self.receive_destroy(world, net_id)?;
            }
            ChunkKind::Rpc => self.receive_rpc(world, body)?,
        }
        Ok(())
    }

    fn expect_authority(&self, kind: ChunkKind) -> Result<(), ProtocolViolation> {
        if self.host_type.is_authority() {
            Ok(())
        } else {
            Err(ProtocolViolation::UnexpectedChunk { kind })
        }
    }

    fn expect_subordinate(&self, kind: ChunkKind) -> Result<(), ProtocolViolation> {
        if self.host_type.is_authority() {
            Err(ProtocolViolation::UnexpectedChunk { kind })
        } else {
            Ok(())
        }
    }

    fn receive_handshake(&mut self, level: LevelId) {
        self.remote_level = Some(level);
        if level != self.local_level {
            warn!(
                "Connection {:?} reported level {} while the current level is {}",
                self.connection, level, self.local_level
            );
            return;
        }
        if self.state.is_synced() {
            return;
        }
        self.state = ChannelState::Synced;
        self.travel_completed = true;
        self.events.push(ChannelEvent::Synced(level));
        info!("Connection {:?} synced on level {}", self.connection, level);
    }

    fn receive_object(&mut self, world: &mut ObjectWorld, body: &[u8]) -> Result<(), ChannelError> {
        let mut reader = BitReader::new(body);
        let header = ObjectHeader::de(&mut reader).map_err(|_| ProtocolViolation::MalformedChunk {
            kind: ChunkKind::ObjectData,
        })?;
        let net_id = header.net_id;

        if let Some(create) = header.create {
            return self.receive_create(world, &mut reader, body, net_id, create);
        }

        let Some(replicator) = self.replicators.get_mut(&net_id) else {
            let violation = if self.torn_off.contains(&net_id) {
                ProtocolViolation::UpdateAfterTearOff { net_id }
            } else {
                ProtocolViolation::UnknownObject { net_id }
            };
            return Err(violation.into());
        };

        if header.tear_off {
            check_consumed(ChunkKind::ObjectData, body, &reader)?;
            replicator.abandon(world);
            self.replicators.remove(&net_id);
            self.pending.remove_object(net_id);
            world.mark_torn_off(net_id)?;
            self.torn_off.insert(net_id);
            self.events.push(ChannelEvent::TornOff(net_id));
            return Ok(());
        }

        if replicator.update_relevancy(header.relevant) {
            self.events.push(ChannelEvent::RelevancyChanged {
                net_id,
                relevant: header.relevant,
            });
        }
        if header.relevant {
            replicator.read_fields(&mut reader, world, &mut self.pending, self.clock)?;
        }
        check_consumed(ChunkKind::ObjectData, body, &reader)?;
        Ok(())
    }

    fn receive_create(
        &mut self,
        world: &mut ObjectWorld,
        reader: &mut BitReader,
        body: &[u8],
        net_id: NetId,
        create: CreateInfo,
    ) -> Result<(), ChannelError> {
        if self.replicators.contains_key(&net_id) || world.contains(net_id) {
            return Err(ProtocolViolation::DuplicateCreate { net_id }.into());
        }
        let class = self.protocol.class(create.class_id)?.clone();
        let outer = create.outer.filter(|outer| world.contains(*outer));
        world.insert_shadow(net_id, class.instantiate(), outer)?;
        self.torn_off.remove(&net_id);
        self.events.push(ChannelEvent::ObjectCreated {
            net_id,
            class_id: create.class_id,
        });

        let mut replicator = ObjectReplicator::new(net_id, class, false);
        replicator.read_fields(reader, world, &mut self.pending, self.clock)?;
        check_consumed(ChunkKind::ObjectData, body, reader)?;
        self.replicators.insert(net_id, replicator);

        self.resolve_pending(world, net_id)
    }

    /// Substitutes a newly created object into every field that was waiting
    /// for it
    fn resolve_pending(&mut self, world: &mut ObjectWorld, referent: NetId) -> Result<(), ChannelError> {
        for waiting in self.pending.take(referent) {
            if let Some(replicator) = self.replicators.get_mut(&waiting.object) {
                replicator.resolve_reference(waiting.field, referent, world)?;
            }
        }
        Ok(())
    }

    fn receive_destroy(&mut self, world: &mut ObjectWorld, net_id: NetId) -> Result<(), ChannelError> {
        match self.replicators.remove(&net_id) {
            Some(mut replicator) => replicator.abandon(world),
            None => {
                if !self.torn_off.contains(&net_id) {
                    return Err(ProtocolViolation::UnknownObject { net_id }.into());
                }
            }
        }
        self.torn_off.remove(&net_id);
        self.pending.remove_object(net_id);
        world.remove_shadow(net_id);
        self.events.push(ChannelEvent::ObjectDestroyed(net_id));
        Ok(())
    }

    fn receive_rpc(&mut self, world: &ObjectWorld, body: &[u8]) -> Result<(), ChannelError> {
        let chunk = RpcChunk::from_body(body)?;
        let rpc_id = chunk.rpc_id;
        let rpc = self
            .protocol
            .rpc(rpc_id)
            .ok_or(ProtocolViolation::UnknownRpc { rpc_id })?;
        if !rpc.spec.domain.is_receivable_by(self.host_type) {
            return Err(ProtocolViolation::IllegalRemoteCall { rpc_id }.into());
        }
        let args = RpcRouter::decode_args(rpc, &chunk.args)
            .map_err(|_| ProtocolViolation::MalformedChunk { kind: ChunkKind::Rpc })?;

        let Some(object) = world.get(chunk.net_id) else {
            debug!("Dropped RPC {} for unknown object {}", rpc_id, chunk.net_id);
            return Ok(());
        };
        if object.class_id() != rpc.spec.class_id {
            return Err(ProtocolViolation::RpcClassMismatch {
                rpc_id,
                net_id: chunk.net_id,
            }
            .into());
        }
        if self.host_type.is_authority() {
            if object.owner() != Some(self.connection) {
                warn!(
                    "Dropped RPC {} from {:?}, which does not own object {}",
                    rpc_id, self.connection, chunk.net_id
                );
                return Ok(());
            }
            if object.is_torn_off() {
                debug!("Dropped RPC {} on torn off object {}", rpc_id, chunk.net_id);
                return Ok(());
            }
        }

        self.events.push(ChannelEvent::Rpc(IncomingRpc {
            from: self.connection,
            net_id: chunk.net_id,
            rpc_id,
            args,
        }));
        Ok(())
    }

    /// Subordinate: drops received references whose referent has not arrived
    /// within the configured time
    pub fn expire_pending_references(&mut self, world: &mut ObjectWorld) {
        let ttl = f64::from(self.config.pending_reference_ttl);
        for expired in self.pending.expire(self.clock, ttl) {
            warn!(
                "Field {} of object {} gave up waiting for its referent after {}s",
                expired.field, expired.object, self.config.pending_reference_ttl
            );
            if let Some(replicator) = self.replicators.get_mut(&expired.object) {
                replicator.drop_reference(world);
            }
        }
    }
}

fn write_header_only(writer: &mut PacketWriter, header: &ObjectHeader) -> Result<(), ChannelError> {
    let mut body = BitWriter::new();
    header.ser(&mut body);
    writer.write_chunk(ChunkKind::ObjectData, &body.to_bytes())
}
