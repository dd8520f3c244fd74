use tether_client::ClientEvent;
use tether_shared::{ActorState, FieldValue, NetId, Relevancy};
use tether_test::{
    object_chunks,
    test_protocol::{NODE, NODE_LABEL, NODE_VALUE},
    TestSession,
};

fn session_with_node() -> (TestSession, NetId) {
    let mut session = TestSession::new(tether_test::protocol(), 1);
    let node = session
        .server
        .world_mut()
        .spawn_actor(NODE, ActorState::default())
        .unwrap();
    session
        .server
        .world_mut()
        .set_field(node, NODE_LABEL, FieldValue::String("gate".to_string()))
        .unwrap();
    session.connect();
    session.client(0).from_server.take();
    session.client_mut(0).take_events();
    (session, node)
}

#[test]
fn leaving_and_returning_resends_every_field_once() {
    let (mut session, node) = session_with_node();

    session
        .server
        .world_mut()
        .set_relevancy(node, Relevancy::Never)
        .unwrap();
    session.tick();

    let objects = object_chunks(&session.client(0).from_server.take());
    assert_eq!(objects.len(), 1);
    assert!(!objects[0].header.relevant);
    assert!(objects[0].field_mask.is_none());
    assert!(session
        .client_mut(0)
        .take_events()
        .contains(&ClientEvent::RelevancyChanged {
            net_id: node,
            relevant: false,
        }));

    // still irrelevant: silence
    session.tick_n(2);
    assert!(object_chunks(&session.client(0).from_server.take()).is_empty());

    session
        .server
        .world_mut()
        .set_field(node, NODE_VALUE, FieldValue::I32(12))
        .unwrap();
    session
        .server
        .world_mut()
        .set_relevancy(node, Relevancy::Always)
        .unwrap();
    session.tick();

    let objects = object_chunks(&session.client(0).from_server.take());
    assert_eq!(objects.len(), 1);
    assert!(objects[0].header.relevant);
    assert!(objects[0].header.create.is_none());
    assert_eq!(objects[0].present_fields(), vec![0, 1, 2, 3]);
    assert_eq!(
        session.client(0).client.world().field(node, NODE_VALUE),
        Some(FieldValue::I32(12))
    );

    session.tick_n(2);
    assert!(object_chunks(&session.client(0).from_server.take()).is_empty());
}

/// Relevancy is sampled once per sweep: turning an actor off and back on
/// between two sweeps is never observed, so nothing is resent. A toggle
/// spanning a sweep resends once, as above.
#[test]
fn toggling_between_two_sweeps_is_not_observed() {
    let (mut session, node) = session_with_node();

    let world = session.server.world_mut();
    world.set_relevancy(node, Relevancy::Never).unwrap();
    world.set_relevancy(node, Relevancy::Always).unwrap();
    session.tick();

    assert!(object_chunks(&session.client(0).from_server.take()).is_empty());
    assert!(!session
        .client_mut(0)
        .take_events()
        .iter()
        .any(|event| matches!(event, ClientEvent::RelevancyChanged { .. })));
}

#[test]
fn relevancy_is_decided_per_connection() {
    let mut session = TestSession::new(tether_test::protocol(), 2);
    let seen_by = session.client(1).connection;
    let node = session
        .server
        .world_mut()
        .spawn_actor(
            NODE,
            ActorState {
                relevancy: Relevancy::Custom(std::sync::Arc::new(move |connection| {
                    connection == seen_by
                })),
                ..ActorState::default()
            },
        )
        .unwrap();
    session.connect();

    assert!(!session.client(0).client.world().contains(node));
    assert!(session.client(1).client.world().contains(node));
}

#[test]
fn tearing_off_an_irrelevant_actor_reaches_the_client() {
    let (mut session, node) = session_with_node();

    session
        .server
        .world_mut()
        .set_relevancy(node, Relevancy::Never)
        .unwrap();
    session.tick();
    session.client(0).from_server.take();
    session.client_mut(0).take_events();

    session.server.world_mut().tear_off(node).unwrap();
    session.tick();

    let objects = object_chunks(&session.client(0).from_server.take());
    assert_eq!(objects.len(), 1);
    assert!(objects[0].header.tear_off);
    assert!(!objects[0].header.relevant);
    assert!(objects[0].field_mask.is_none());
    assert!(session
        .client_mut(0)
        .take_events()
        .contains(&ClientEvent::TornOff(node)));
    assert!(session
        .client(0)
        .client
        .world()
        .get(node)
        .is_some_and(|object| object.is_torn_off()));
}
