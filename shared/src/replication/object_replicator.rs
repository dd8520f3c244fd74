use std::sync::Arc;

use tether_serde::{BitReader, BitWrite, Serde, SerdeErr};

use crate::{
    connection::{
        chunk::ChunkKind,
        error::{ChannelError, ProtocolViolation},
    },
    replication::{
        dependency_resolver::PendingReferences,
        field_tracker::{FieldDeltaTracker, SendParams},
    },
    schema::{error::SchemaError, field_registry::ClassInfo, field_value::FieldValue},
    types::{ClassId, FieldIndex, NetId},
    world::{object_world::ObjectWorld, replicate::Replicate},
};

/// Replication state of one object on one channel.
///
/// The sending side uses the delta tracker and relevancy bookkeeping; the
/// receiving side uses the last-received baselines and the batched
/// on-changed notifications.
pub struct ObjectReplicator {
    net_id: NetId,
    class: Arc<ClassInfo>,
    is_owner: bool,

    tracker: FieldDeltaTracker,
    has_ever_sent: bool,
    was_relevant: bool,
    pending_full_resend: bool,
    rate_elapsed: f32,

    last_received: Vec<Option<FieldValue>>,
    unresolved: usize,
    pending_notify: Vec<(FieldIndex, FieldValue)>,
}

impl ObjectReplicator {
    pub fn new(net_id: NetId, class: Arc<ClassInfo>, is_owner: bool) -> Self {
        let field_count = class.field_count();
        Self {
            net_id,
            class,
            is_owner,
            tracker: FieldDeltaTracker::new(field_count),
            has_ever_sent: false,
            was_relevant: true,
            pending_full_resend: false,
            rate_elapsed: 0.0,
            last_received: vec![None; field_count],
            unresolved: 0,
            pending_notify: Vec::new(),
        }
    }

    pub fn net_id(&self) -> NetId {
        self.net_id
    }

    pub fn class_id(&self) -> ClassId {
        self.class.class_id()
    }

    pub fn is_owner(&self) -> bool {
        self.is_owner
    }

    pub fn has_ever_sent(&self) -> bool {
        self.has_ever_sent
    }

    pub fn was_relevant(&self) -> bool {
        self.was_relevant
    }

    pub fn needs_full_resend(&self) -> bool {
        self.pending_full_resend
    }

    /// Number of received reference fields still waiting on their referent
    pub fn unresolved_count(&self) -> usize {
        self.unresolved
    }

    // Sending

    /// Records this sweep's relevancy and returns whether it changed.
    /// Becoming relevant again arms a single full re-send.
    pub fn update_relevancy(&mut self, relevant: bool) -> bool {
        if relevant == self.was_relevant {
            return false;
        }
        self.was_relevant = relevant;
        self.pending_full_resend = relevant;
        true
    }

    /// Accumulates `dt` toward the object's replicate rate. Returns the
    /// elapsed time once the rate has passed.
    pub fn advance_rate(&mut self, dt: f32, rate: f32) -> Option<f32> {
        self.rate_elapsed += dt;
        if self.rate_elapsed < rate {
            return None;
        }
        Some(std::mem::take(&mut self.rate_elapsed))
    }

    /// Writes every field whose condition allows it, for the creation chunk.
    pub fn full_serialize(
        &mut self,
        object: &dyn Replicate,
        writer: &mut dyn BitWrite,
        reference_visible: &dyn Fn(NetId) -> bool,
        references: &mut Vec<NetId>,
    ) -> Result<bool, SchemaError> {
        let params = SendParams::initial(self.is_owner);
        let wrote = self.write_fields(object, &params, writer, reference_visible, references)?;
        self.has_ever_sent = true;
        self.pending_full_resend = false;
        Ok(wrote)
    }

    /// Writes the fields that changed since they were last sent. A forced
    /// flush, or a pending relevancy re-send, writes every eligible field in
    /// full instead.
    pub fn delta_serialize(
        &mut self,
        object: &dyn Replicate,
        dt: f32,
        force_flush: bool,
        writer: &mut dyn BitWrite,
        reference_visible: &dyn Fn(NetId) -> bool,
        references: &mut Vec<NetId>,
    ) -> Result<bool, SchemaError> {
        let forced = force_flush || std::mem::take(&mut self.pending_full_resend);
        let params = SendParams {
            dt,
            delta_only: !forced,
            has_ever_sent: self.has_ever_sent,
            is_owner: self.is_owner,
            force_flush: forced,
        };
        let wrote = self.write_fields(object, &params, writer, reference_visible, references)?;
        self.has_ever_sent = true;
        Ok(wrote)
    }

    fn write_fields(
        &mut self,
        object: &dyn Replicate,
        params: &SendParams,
        writer: &mut dyn BitWrite,
        reference_visible: &dyn Fn(NetId) -> bool,
        references: &mut Vec<NetId>,
    ) -> Result<bool, SchemaError> {
        let class = self.class.clone();

        let mut present = Vec::new();
        for field in class.fields() {
            let Some(current) = object.field(field.index) else {
                continue;
            };
            if self
                .tracker
                .should_send(field, &current, params, reference_visible)
            {
                present.push((field, current));
            }
        }

        // bitmap: highest present index + 1, then one presence bit per index
        let num_bits = present
            .last()
            .map_or(0, |(field, _)| usize::from(field.index) + 1);
        let mut mask = vec![false; num_bits];
        for (field, _) in &present {
            mask[usize::from(field.index)] = true;
        }
        (num_bits as u8).ser(writer);
        for bit in mask {
            writer.write_bit(bit);
        }

        for (field, current) in &present {
            let baseline = if params.delta_only && field.serde.supports_delta() {
                self.tracker.last_sent(field).cloned()
            } else {
                None
            };
            match baseline {
                Some(baseline) => {
                    writer.write_bit(true);
                    field.serde.ser_delta(&baseline, current, writer)?;
                }
                None => {
                    writer.write_bit(false);
                    field.serde.ser(current, writer)?;
                }
            }
            self.tracker.commit(field, current);
            if let Some(referent) = current.as_reference() {
                references.push(referent);
            }
        }

        Ok(!present.is_empty())
    }

    // Receiving

    /// Reads a field bitmap and the present values, then applies them.
    ///
    /// References to objects not yet known locally are deferred through
    /// `pending`; on-changed callbacks of this object are held back until
    /// none of its references are outstanding.
    pub fn read_fields(
        &mut self,
        reader: &mut BitReader,
        world: &mut ObjectWorld,
        pending: &mut PendingReferences,
        now: f64,
    ) -> Result<(), ChannelError> {
        let malformed = |_: SerdeErr| ProtocolViolation::MalformedChunk {
            kind: ChunkKind::ObjectData,
        };
        let class = self.class.clone();

        let num_bits = usize::from(u8::de(reader).map_err(malformed)?);
        if num_bits > class.field_count() {
            return Err(ProtocolViolation::FieldCountExceeded {
                net_id: self.net_id,
                class_id: class.class_id(),
                num_bits,
                field_count: class.field_count(),
            }
            .into());
        }
        let mut mask = Vec::with_capacity(num_bits);
        for _ in 0..num_bits {
            mask.push(reader.read_bit().map_err(malformed)?);
        }

        let mut decoded = Vec::new();
        for (field, present) in class.fields().iter().zip(mask) {
            if !present {
                continue;
            }
            let slot = usize::from(field.index);
            let is_delta = reader.read_bit().map_err(malformed)?;
            let decoded_value = if is_delta {
                let Some(baseline) = &self.last_received[slot] else {
                    return Err(ProtocolViolation::DeltaWithoutBaseline {
                        net_id: self.net_id,
                        field: slot,
                    }
                    .into());
                };
                field.serde.de_delta(baseline, reader)
            } else {
                field.serde.de(reader)
            };
            let value = decoded_value.map_err(malformed)?;
            self.last_received[slot] = Some(field.serde.copy_value(&value));
            decoded.push((field.index, value));
        }

        for (index, value) in decoded {
            self.apply(index, value, world, pending, now)?;
        }
        self.flush_notifications(world);
        Ok(())
    }

    fn apply(
        &mut self,
        index: FieldIndex,
        value: FieldValue,
        world: &mut ObjectWorld,
        pending: &mut PendingReferences,
        now: f64,
    ) -> Result<(), ChannelError> {
        if let Some(referent) = value.as_reference() {
            if !world.contains(referent) {
                if !pending.subscribe(referent, self.net_id, index, now) {
                    self.unresolved += 1;
                }
                return Ok(());
            }
        }
        if pending.unsubscribe(self.net_id, index) {
            self.unresolved = self.unresolved.saturating_sub(1);
        }
        self.assign(index, value, world)
    }

    fn assign(&mut self, index: FieldIndex, value: FieldValue, world: &mut ObjectWorld) -> Result<(), ChannelError> {
        let old = world.field(self.net_id, index);
        world.set_field(self.net_id, index, value)?;
        if let Some(old) = old {
            // keep the oldest value if the field changes again before firing
            if !self.pending_notify.iter().any(|(pending, _)| *pending == index) {
                self.pending_notify.push((index, old));
            }
        }
        Ok(())
    }

    /// Substitutes a referent that has just arrived
    pub fn resolve_reference(
        &mut self,
        index: FieldIndex,
        referent: NetId,
        world: &mut ObjectWorld,
    ) -> Result<(), ChannelError> {
        self.unresolved = self.unresolved.saturating_sub(1);
        self.assign(index, FieldValue::Reference(Some(referent)), world)?;
        self.flush_notifications(world);
        Ok(())
    }

    /// Gives up on a reference that never arrived; the field keeps its
    /// previous value
    pub fn drop_reference(&mut self, world: &mut ObjectWorld) {
        self.unresolved = self.unresolved.saturating_sub(1);
        self.flush_notifications(world);
    }

    /// Fires whatever is batched, regardless of outstanding references
    pub fn abandon(&mut self, world: &mut ObjectWorld) {
        self.unresolved = 0;
        self.flush_notifications(world);
    }

    fn flush_notifications(&mut self, world: &mut ObjectWorld) {
        if self.unresolved > 0 || self.pending_notify.is_empty() {
            return;
        }
        let class = self.class.clone();
        for (index, old) in std::mem::take(&mut self.pending_notify) {
            let Some(field) = class.field(index) else {
                continue;
            };
            let Some(callback) = &field.on_changed else {
                continue;
            };
            let Some(object) = world.object_mut(self.net_id) else {
                return;
            };
            let unchanged = object
                .field(index)
                .is_some_and(|current| field.serde.equals(&current, &old));
            if !unchanged {
                callback(object, &old);
            }
        }
    }
}
