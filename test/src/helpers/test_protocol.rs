use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use tether_shared::{
    ClassId, ClassSchema, FieldIndex, FieldSpec, FieldType, FieldValue, Protocol,
    ReplicationCondition, RpcDomain, RpcId, RpcSpec,
};

pub const PAWN: ClassId = 7;
pub const PAWN_HP: FieldIndex = 0;
pub const PAWN_TARGET: FieldIndex = 1;
pub const PAWN_SECRET: FieldIndex = 2;
pub const PAWN_NAME: FieldIndex = 3;

pub const NODE: ClassId = 8;
pub const NODE_VALUE: FieldIndex = 0;
pub const NODE_NEXT: FieldIndex = 1;
pub const NODE_POSITION: FieldIndex = 2;
pub const NODE_LABEL: FieldIndex = 3;

pub const MARKER: ClassId = 9;
/// Only sent in the creation chunk
pub const MARKER_ORIGIN: FieldIndex = 0;
/// Checked at most every `MARKER_HEAT_RATE` seconds
pub const MARKER_HEAT: FieldIndex = 1;
pub const MARKER_HEAT_RATE: f32 = 0.25;

/// Client -> server, one i32
pub const HEAL: RpcId = 1;
/// Server -> every client, one reference
pub const ANNOUNCE: RpcId = 2;
/// Server -> the owner, one i32
pub const WHISPER: RpcId = 3;
/// Server -> everyone but the owner
pub const TAUNT: RpcId = 4;

/// The protocol every end-to-end test runs, with a record of the
/// `hp` notifications applied on receiving hosts.
pub struct TestProtocol {
    pub protocol: Arc<Protocol>,
    hp_changes: Arc<AtomicUsize>,
    hp_history: Arc<Mutex<Vec<(i32, i32)>>>,
}

impl TestProtocol {
    pub fn new() -> Self {
        let hp_changes = Arc::new(AtomicUsize::new(0));
        let hp_history = Arc::new(Mutex::new(Vec::new()));

        let counter = hp_changes.clone();
        let history = hp_history.clone();
        let hp = FieldSpec::new("hp", FieldType::I32).on_changed(move |object, old| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let (Some(FieldValue::I32(new)), FieldValue::I32(old)) = (object.field(PAWN_HP), old) {
                history.lock().unwrap().push((*old, new));
            }
        });

        let mut builder = Protocol::builder();
        builder
            .add_class(
                ClassSchema::new(PAWN, "Pawn")
                    .field(hp)
                    .field(FieldSpec::new("target", FieldType::Reference))
                    .field(
                        FieldSpec::new("secret", FieldType::I32)
                            .condition(ReplicationCondition::OwnerOnly),
                    )
                    .field(FieldSpec::new("name", FieldType::String)),
            )
            .add_class(
                ClassSchema::new(NODE, "Node")
                    .field(FieldSpec::new("value", FieldType::I32))
                    .field(FieldSpec::new("next", FieldType::Reference))
                    .field(FieldSpec::new("position", FieldType::Vec3))
                    .field(FieldSpec::new("label", FieldType::String)),
            )
            .add_class(
                ClassSchema::new(MARKER, "Marker")
                    .field(
                        FieldSpec::new("origin", FieldType::I32)
                            .condition(ReplicationCondition::InitialOnly),
                    )
                    .field(FieldSpec::new("heat", FieldType::I32).update_rate(MARKER_HEAT_RATE)),
            )
            .add_rpc(RpcSpec::new(HEAL, "heal", PAWN, RpcDomain::Server).param(FieldType::I32))
            .add_rpc(
                RpcSpec::new(ANNOUNCE, "announce", PAWN, RpcDomain::Multicast)
                    .param(FieldType::Reference),
            )
            .add_rpc(RpcSpec::new(WHISPER, "whisper", PAWN, RpcDomain::Owner).param(FieldType::I32))
            .add_rpc(RpcSpec::new(TAUNT, "taunt", PAWN, RpcDomain::MulticastExcludeOwner));

        Self {
            protocol: Arc::new(builder.build().unwrap()),
            hp_changes,
            hp_history,
        }
    }

    /// How many `hp` notifications have fired so far
    pub fn hp_changes(&self) -> usize {
        self.hp_changes.load(Ordering::SeqCst)
    }

    /// `(old, new)` of every `hp` notification, in order
    pub fn hp_history(&self) -> Vec<(i32, i32)> {
        self.hp_history.lock().unwrap().clone()
    }
}

impl Default for TestProtocol {
    fn default() -> Self {
        Self::new()
    }
}

pub fn protocol() -> Arc<Protocol> {
    TestProtocol::new().protocol
}
