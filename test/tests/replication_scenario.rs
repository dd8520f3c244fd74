use tether_client::ClientEvent;
use tether_shared::{ActorState, DropReason, FieldValue, RpcDelivery};
use tether_test::{
    object_chunks, rpc_chunk_count,
    test_protocol::{ANNOUNCE, PAWN, PAWN_HP},
    TestProtocol, TestSession,
};

#[test]
fn pawn_update_tear_off_and_late_rpc() {
    let test_protocol = TestProtocol::new();
    let mut session = TestSession::new(test_protocol.protocol.clone(), 1);

    let pawn = session
        .server
        .world_mut()
        .spawn_actor(PAWN, ActorState::default())
        .unwrap();
    session
        .server
        .world_mut()
        .set_field(pawn, PAWN_HP, FieldValue::I32(100))
        .unwrap();
    session.connect();

    let client_hp = |session: &TestSession| session.client(0).client.world().field(pawn, PAWN_HP);
    assert_eq!(client_hp(&session), Some(FieldValue::I32(100)));
    assert_eq!(test_protocol.hp_changes(), 1);

    // nothing changed, nothing sent
    session.client(0).from_server.take();
    session.tick();
    assert!(object_chunks(&session.client(0).from_server.take()).is_empty());

    session
        .server
        .world_mut()
        .set_field(pawn, PAWN_HP, FieldValue::I32(80))
        .unwrap();
    session.tick();

    let objects = object_chunks(&session.client(0).from_server.take());
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].header.net_id, pawn);
    assert!(objects[0].header.create.is_none());
    assert_eq!(objects[0].present_fields(), vec![usize::from(PAWN_HP)]);
    assert_eq!(client_hp(&session), Some(FieldValue::I32(80)));
    assert_eq!(test_protocol.hp_history(), vec![(0, 100), (100, 80)]);

    session.server.world_mut().tear_off(pawn).unwrap();
    session.tick();

    let objects = object_chunks(&session.client(0).from_server.take());
    assert_eq!(objects.len(), 1);
    assert!(objects[0].header.tear_off);
    assert!(objects[0].field_mask.is_none());
    assert!(session
        .client_mut(0)
        .take_events()
        .contains(&ClientEvent::TornOff(pawn)));
    // the torn-off copy stays on the client
    assert_eq!(client_hp(&session), Some(FieldValue::I32(80)));

    let deliveries = session
        .server
        .invoke(pawn, ANNOUNCE, &[FieldValue::Reference(None)])
        .unwrap();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].1, RpcDelivery::Dropped(DropReason::TornOff));

    session.tick();
    assert_eq!(rpc_chunk_count(&session.client(0).from_server.take()), 0);
    assert!(!session
        .client_mut(0)
        .take_events()
        .iter()
        .any(|event| matches!(event, ClientEvent::Rpc(_))));
}

#[test]
fn later_updates_after_tear_off_are_not_sent() {
    let mut session = TestSession::new(tether_test::protocol(), 1);
    let pawn = session
        .server
        .world_mut()
        .spawn_actor(PAWN, ActorState::default())
        .unwrap();
    session.connect();

    session.server.world_mut().tear_off(pawn).unwrap();
    session.tick();
    session.client(0).from_server.take();

    session
        .server
        .world_mut()
        .set_field(pawn, PAWN_HP, FieldValue::I32(5))
        .unwrap();
    session.tick_n(3);

    assert!(object_chunks(&session.client(0).from_server.take()).is_empty());
    assert_eq!(
        session.client(0).client.world().field(pawn, PAWN_HP),
        Some(FieldValue::I32(0))
    );
}
