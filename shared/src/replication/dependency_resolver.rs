use std::collections::{HashMap, HashSet, VecDeque};

use crate::types::{FieldIndex, NetId};

/// Send side: objects referenced by written fields that the remote peer
/// has not been sent yet.
///
/// Drained in batches so objects discovered while draining land in the next
/// batch. An id is attempted at most once per flush, which bounds the drain
/// even for reference cycles.
#[derive(Default)]
pub struct DependencyQueue {
    queue: VecDeque<NetId>,
    attempted: HashSet<NetId>,
}

impl DependencyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the id was already queued or attempted this flush
    pub fn push(&mut self, net_id: NetId) -> bool {
        if !self.attempted.insert(net_id) {
            return false;
        }
        self.queue.push_back(net_id);
        true
    }

    pub fn next_batch(&mut self) -> Vec<NetId> {
        self.queue.drain(..).collect()
    }

    pub fn remove(&mut self, net_id: NetId) {
        self.queue.retain(|queued| *queued != net_id);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Forgets which ids were attempted. Call once the flush is complete.
    pub fn finish_flush(&mut self) {
        self.queue.clear();
        self.attempted.clear();
    }
}

/// A field waiting for a referenced object to arrive
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingField {
    pub object: NetId,
    pub field: FieldIndex,
    /// Channel clock at subscription, in seconds
    pub since: f64,
}

/// Receive side: referent id -> fields that named it before it existed.
#[derive(Default)]
pub struct PendingReferences {
    by_referent: HashMap<NetId, Vec<PendingField>>,
    by_field: HashMap<(NetId, FieldIndex), NetId>,
}

impl PendingReferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `(object, field)` as waiting on `referent`. Returns `true`
    /// if the field was already waiting (on this or another referent), in
    /// which case the older subscription is replaced.
    pub fn subscribe(&mut self, referent: NetId, object: NetId, field: FieldIndex, now: f64) -> bool {
        let replaced = self.unsubscribe(object, field);
        self.by_referent.entry(referent).or_default().push(PendingField {
            object,
            field,
            since: now,
        });
        self.by_field.insert((object, field), referent);
        replaced
    }

    /// Returns `true` if the field had a pending subscription
    pub fn unsubscribe(&mut self, object: NetId, field: FieldIndex) -> bool {
        let Some(referent) = self.by_field.remove(&(object, field)) else {
            return false;
        };
        if let Some(waiting) = self.by_referent.get_mut(&referent) {
            waiting.retain(|pending| !(pending.object == object && pending.field == field));
            if waiting.is_empty() {
                self.by_referent.remove(&referent);
            }
        }
        true
    }

    /// Removes and returns every field waiting on `referent`
    pub fn take(&mut self, referent: NetId) -> Vec<PendingField> {
        let waiting = self.by_referent.remove(&referent).unwrap_or_default();
        for pending in &waiting {
            self.by_field.remove(&(pending.object, pending.field));
        }
        waiting
    }

    /// Drops every subscription held by `object`
    pub fn remove_object(&mut self, object: NetId) -> usize {
        let fields: Vec<FieldIndex> = self
            .by_field
            .keys()
            .filter(|(owner, _)| *owner == object)
            .map(|(_, field)| *field)
            .collect();
        for field in &fields {
            self.unsubscribe(object, *field);
        }
        fields.len()
    }

    /// Removes and returns subscriptions older than `ttl` seconds
    pub fn expire(&mut self, now: f64, ttl: f64) -> Vec<PendingField> {
        let mut expired = Vec::new();
        self.by_referent.retain(|_, waiting| {
            waiting.retain(|pending| {
                if now - pending.since >= ttl {
                    expired.push(*pending);
                    false
                } else {
                    true
                }
            });
            !waiting.is_empty()
        });
        for pending in &expired {
            self.by_field.remove(&(pending.object, pending.field));
        }
        expired
    }

    pub fn is_pending(&self, object: NetId, field: FieldIndex) -> bool {
        self.by_field.contains_key(&(object, field))
    }

    pub fn len(&self) -> usize {
        self.by_field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }
}
