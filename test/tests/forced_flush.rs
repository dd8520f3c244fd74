use tether_shared::{ActorState, FieldValue};
use tether_test::{
    object_chunks,
    test_protocol::{NODE, NODE_VALUE, PAWN, PAWN_HP, PAWN_NAME, PAWN_TARGET},
    TestSession,
};

#[test]
fn flush_resends_every_eligible_field_once() {
    let mut session = TestSession::new(tether_test::protocol(), 1);
    let pawn = session
        .server
        .world_mut()
        .spawn_actor(PAWN, ActorState::default())
        .unwrap();
    session.connect();
    session.tick();
    session.client(0).from_server.take();

    session.server.request_flush();
    session.tick();

    let objects = object_chunks(&session.client(0).from_server.take());
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].header.net_id, pawn);
    assert!(objects[0].header.create.is_none());
    // the owner-only secret stays off a channel that does not own the pawn
    assert_eq!(
        objects[0].present_fields(),
        vec![
            usize::from(PAWN_HP),
            usize::from(PAWN_TARGET),
            usize::from(PAWN_NAME)
        ]
    );

    session.tick_n(2);
    assert!(object_chunks(&session.client(0).from_server.take()).is_empty());
}

#[test]
fn flush_ignores_the_replicate_rate() {
    let mut session = TestSession::new(tether_test::protocol(), 1);
    let node = session
        .server
        .world_mut()
        .spawn_actor(
            NODE,
            ActorState {
                replicate_rate: 30.0,
                ..ActorState::default()
            },
        )
        .unwrap();
    session.connect();
    session
        .server
        .world_mut()
        .set_field(node, NODE_VALUE, FieldValue::I32(6))
        .unwrap();
    session.tick();
    session.client(0).from_server.take();

    session.server.request_flush();
    session.tick();

    let objects = object_chunks(&session.client(0).from_server.take());
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].present_fields(), vec![0, 1, 2, 3]);
    assert_eq!(
        session.client(0).client.world().field(node, NODE_VALUE),
        Some(FieldValue::I32(6))
    );
}
