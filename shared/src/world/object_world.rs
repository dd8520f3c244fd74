use std::{
    collections::{btree_map, BTreeMap},
    sync::Arc,
};

use log::{debug, info};

use crate::{
    protocol::Protocol,
    schema::field_value::FieldValue,
    types::{ClassId, ConnectionId, FieldIndex, HostType, NetId},
    world::{error::WorldError, net_id_pool::NetIdPool, relevancy::Relevancy, replicate::Replicate},
};

/// Actor-only replication state.
#[derive(Clone, Debug)]
pub struct ActorState {
    pub owner: Option<ConnectionId>,
    /// Only the owner's channel ever sees this actor
    pub owner_only: bool,
    /// Minimum seconds between two field sweeps of this actor on a channel
    pub replicate_rate: f32,
    pub relevancy: Relevancy,
}

impl Default for ActorState {
    fn default() -> Self {
        Self {
            owner: None,
            owner_only: false,
            replicate_rate: 0.0,
            relevancy: Relevancy::Always,
        }
    }
}

impl ActorState {
    pub fn owned_by(owner: ConnectionId) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }
}

/// A replicated object and its replication metadata.
pub struct NetObject {
    instance: Box<dyn Replicate>,
    outer: Option<NetId>,
    actor: Option<ActorState>,
    torn_off: bool,
}

impl NetObject {
    pub fn instance(&self) -> &dyn Replicate {
        self.instance.as_ref()
    }

    pub fn class_id(&self) -> ClassId {
        self.instance.class_id()
    }

    pub fn outer(&self) -> Option<NetId> {
        self.outer
    }

    pub fn actor(&self) -> Option<&ActorState> {
        self.actor.as_ref()
    }

    pub fn owner(&self) -> Option<ConnectionId> {
        self.actor.as_ref().and_then(|actor| actor.owner)
    }

    pub fn is_torn_off(&self) -> bool {
        self.torn_off
    }

    pub fn replicate_rate(&self) -> f32 {
        self.actor.as_ref().map_or(0.0, |actor| actor.replicate_rate)
    }

    /// Owner-only actors are invisible to every other connection
    pub fn is_visible_to(&self, connection: ConnectionId) -> bool {
        match &self.actor {
            Some(actor) if actor.owner_only => actor.owner == Some(connection),
            _ => true,
        }
    }

    pub fn is_relevant_to(&self, connection: ConnectionId) -> bool {
        self.actor
            .as_ref()
            .map_or(true, |actor| actor.relevancy.is_relevant_to(connection))
    }

    pub fn into_instance(self) -> Box<dyn Replicate> {
        self.instance
    }
}

/// The set of replicated objects on one host.
///
/// On the authority it allocates ids and records destructions for the
/// connection manager; on a subordinate it holds the shadows the channel
/// creates.
pub struct ObjectWorld {
    protocol: Arc<Protocol>,
    host_type: HostType,
    ids: NetIdPool,
    objects: BTreeMap<NetId, NetObject>,
    destroyed: Vec<NetId>,
}

impl ObjectWorld {
    pub fn new(protocol: Arc<Protocol>, host_type: HostType) -> Self {
        Self {
            protocol,
            host_type,
            ids: NetIdPool::new(),
            objects: BTreeMap::new(),
            destroyed: Vec::new(),
        }
    }

    pub fn host_type(&self) -> HostType {
        self.host_type
    }

    pub fn protocol(&self) -> &Arc<Protocol> {
        &self.protocol
    }

    fn check_authority(&self, operation: &'static str) -> Result<(), WorldError> {
        if self.host_type.is_authority() {
            Ok(())
        } else {
            Err(WorldError::NotAuthority { operation })
        }
    }

    // Authority

    /// Spawns a plain replicated object of a registered class
    pub fn spawn(&mut self, class_id: ClassId) -> Result<NetId, WorldError> {
        self.spawn_with(class_id, None, None)
    }

    pub fn spawn_actor(&mut self, class_id: ClassId, actor: ActorState) -> Result<NetId, WorldError> {
        self.spawn_with(class_id, None, Some(actor))
    }

    pub fn spawn_with(
        &mut self,
        class_id: ClassId,
        outer: Option<NetId>,
        actor: Option<ActorState>,
    ) -> Result<NetId, WorldError> {
        let class = self
            .protocol
            .class(class_id)
            .map_err(|_| WorldError::UnknownClass { class_id })?;
        let instance = class.instantiate();
        self.spawn_instance(instance, outer, actor)
    }

    /// Registers an application-built instance for replication
    pub fn spawn_instance(
        &mut self,
        instance: Box<dyn Replicate>,
        outer: Option<NetId>,
        actor: Option<ActorState>,
    ) -> Result<NetId, WorldError> {
        self.check_authority("spawn replicated objects")?;
        let class_id = instance.class_id();
        if !self.protocol.registry().contains(class_id) {
            return Err(WorldError::UnknownClass { class_id });
        }
        if let Some(outer) = outer {
            if !self.objects.contains_key(&outer) {
                return Err(WorldError::ObjectNotFound { net_id: outer });
            }
        }
        let net_id = self.ids.allocate()?;
        self.objects.insert(
            net_id,
            NetObject {
                instance,
                outer,
                actor,
                torn_off: false,
            },
        );
        debug!("Spawned object {} of class {}", net_id, class_id);
        Ok(net_id)
    }

    pub fn destroy(&mut self, net_id: NetId) -> Result<(), WorldError> {
        self.check_authority("destroy replicated objects")?;
        self.release(net_id)?;
        Ok(())
    }

    /// Permanently stops replicating an object and hands the instance back.
    /// Remote copies are destroyed as if the object had been.
    pub fn disable_replication(&mut self, net_id: NetId) -> Result<Box<dyn Replicate>, WorldError> {
        self.check_authority("disable replication")?;
        let object = self.release(net_id)?;
        Ok(object.into_instance())
    }

    fn release(&mut self, net_id: NetId) -> Result<NetObject, WorldError> {
        let object = self
            .objects
            .remove(&net_id)
            .ok_or(WorldError::ObjectNotFound { net_id })?;
        for child in self.objects.values_mut() {
            if child.outer == Some(net_id) {
                child.outer = None;
            }
        }
        self.ids.release(net_id);
        self.destroyed.push(net_id);
        Ok(object)
    }

    /// Relinquishes an actor: remote copies stay but stop receiving updates
    pub fn tear_off(&mut self, net_id: NetId) -> Result<(), WorldError> {
        self.check_authority("tear off actors")?;
        let object = self.get_mut(net_id)?;
        if object.actor.is_none() {
            return Err(WorldError::NotAnActor { net_id });
        }
        object.torn_off = true;
        info!("Actor {} torn off", net_id);
        Ok(())
    }

    pub fn set_relevancy(&mut self, net_id: NetId, relevancy: Relevancy) -> Result<(), WorldError> {
        self.actor_mut(net_id)?.relevancy = relevancy;
        Ok(())
    }

    pub fn set_replicate_rate(&mut self, net_id: NetId, seconds: f32) -> Result<(), WorldError> {
        self.actor_mut(net_id)?.replicate_rate = seconds.max(0.0);
        Ok(())
    }

    fn actor_mut(&mut self, net_id: NetId) -> Result<&mut ActorState, WorldError> {
        self.check_authority("change actor state")?;
        self.get_mut(net_id)?
            .actor
            .as_mut()
            .ok_or(WorldError::NotAnActor { net_id })
    }

    /// Ids destroyed since the last call, in destruction order
    pub fn take_destroyed(&mut self) -> Vec<NetId> {
        std::mem::take(&mut self.destroyed)
    }

    // Subordinate

    pub fn insert_shadow(
        &mut self,
        net_id: NetId,
        instance: Box<dyn Replicate>,
        outer: Option<NetId>,
    ) -> Result<(), WorldError> {
        if self.host_type.is_authority() {
            return Err(WorldError::NotSubordinate {
                operation: "insert remote shadows",
            });
        }
        if self.objects.contains_key(&net_id) {
            return Err(WorldError::DuplicateObject { net_id });
        }
        self.objects.insert(
            net_id,
            NetObject {
                instance,
                outer,
                actor: None,
                torn_off: false,
            },
        );
        Ok(())
    }

    pub fn remove_shadow(&mut self, net_id: NetId) -> Option<NetObject> {
        if self.host_type.is_authority() {
            return None;
        }
        self.objects.remove(&net_id)
    }

    /// Marks a shadow as no longer driven by the authority
    pub fn mark_torn_off(&mut self, net_id: NetId) -> Result<(), WorldError> {
        self.get_mut(net_id)?.torn_off = true;
        Ok(())
    }

    // Access

    pub fn contains(&self, net_id: NetId) -> bool {
        self.objects.contains_key(&net_id)
    }

    pub fn get(&self, net_id: NetId) -> Option<&NetObject> {
        self.objects.get(&net_id)
    }

    fn get_mut(&mut self, net_id: NetId) -> Result<&mut NetObject, WorldError> {
        self.objects
            .get_mut(&net_id)
            .ok_or(WorldError::ObjectNotFound { net_id })
    }

    pub fn object(&self, net_id: NetId) -> Option<&dyn Replicate> {
        self.objects.get(&net_id).map(|object| object.instance.as_ref())
    }

    pub fn object_mut(&mut self, net_id: NetId) -> Option<&mut dyn Replicate> {
        self.objects
            .get_mut(&net_id)
            .map(|object| object.instance.as_mut() as &mut dyn Replicate)
    }

    pub fn field(&self, net_id: NetId, index: FieldIndex) -> Option<FieldValue> {
        self.object(net_id).and_then(|object| object.field(index))
    }

    pub fn set_field(&mut self, net_id: NetId, index: FieldIndex, value: FieldValue) -> Result<(), WorldError> {
        let object = self.get_mut(net_id)?;
        object.instance.set_field(index, value)
    }

    /// Objects in ascending id order
    pub fn iter(&self) -> btree_map::Iter<'_, NetId, NetObject> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
