use tether_shared::{ActorState, FieldValue, NetId};
use tether_test::{
    object_chunks,
    test_protocol::{NODE, NODE_VALUE},
    TestSession,
};

fn session_with_rate(replicate_rate: f32) -> (TestSession, NetId) {
    let mut session = TestSession::new(tether_test::protocol(), 1);
    let node = session
        .server
        .world_mut()
        .spawn_actor(
            NODE,
            ActorState {
                replicate_rate,
                ..ActorState::default()
            },
        )
        .unwrap();
    session.connect();
    session.client(0).from_server.take();
    (session, node)
}

/// Ticks until an object chunk reaches the client; returns the tick index
fn ticks_until_sent(session: &mut TestSession, limit: usize) -> Option<usize> {
    (0..limit).find(|_| {
        session.tick();
        !object_chunks(&session.client(0).from_server.take()).is_empty()
    })
}

#[test]
fn rate_limited_actor_is_skipped_until_its_rate_elapses() {
    let (mut session, node) = session_with_rate(0.5);

    // lines the rate timer up with a send
    session
        .server
        .world_mut()
        .set_field(node, NODE_VALUE, FieldValue::I32(4))
        .unwrap();
    assert!(ticks_until_sent(&mut session, 20).is_some());
    assert_eq!(
        session.client(0).client.world().field(node, NODE_VALUE),
        Some(FieldValue::I32(4))
    );

    // 0.5 seconds is 10 ticks
    session
        .server
        .world_mut()
        .set_field(node, NODE_VALUE, FieldValue::I32(5))
        .unwrap();
    let sent_at = ticks_until_sent(&mut session, 20).unwrap();
    assert!((9..=10).contains(&sent_at), "sent at tick {}", sent_at);
    assert_eq!(
        session.client(0).client.world().field(node, NODE_VALUE),
        Some(FieldValue::I32(5))
    );
}

#[test]
fn changing_the_rate_applies_on_the_next_sweep() {
    let (mut session, node) = session_with_rate(0.0);

    let world = session.server.world_mut();
    world.set_replicate_rate(node, 1.0).unwrap();
    world.set_field(node, NODE_VALUE, FieldValue::I32(8)).unwrap();

    assert_eq!(ticks_until_sent(&mut session, 10), None);
    assert_eq!(
        session.client(0).client.world().field(node, NODE_VALUE),
        Some(FieldValue::I32(0))
    );

    session
        .server
        .world_mut()
        .set_replicate_rate(node, 0.0)
        .unwrap();
    assert_eq!(ticks_until_sent(&mut session, 1), Some(0));
    assert_eq!(
        session.client(0).client.world().field(node, NODE_VALUE),
        Some(FieldValue::I32(8))
    );
}
