use tether_shared::{FieldValue, NetId};
use tether_test::{
    object_chunks,
    test_protocol::{MARKER, MARKER_HEAT, MARKER_ORIGIN},
    TestSession,
};

#[test]
fn initial_only_field_is_written_once() {
    let mut session = TestSession::new(tether_test::protocol(), 1);
    let marker = session.server.world_mut().spawn(MARKER).unwrap();
    session
        .server
        .world_mut()
        .set_field(marker, MARKER_ORIGIN, FieldValue::I32(5))
        .unwrap();
    session.connect();

    let creations = object_chunks(&session.client(0).from_server.take());
    assert_eq!(creations.len(), 1);
    assert!(creations[0]
        .present_fields()
        .contains(&usize::from(MARKER_ORIGIN)));
    assert_eq!(
        session.client(0).client.world().field(marker, MARKER_ORIGIN),
        Some(FieldValue::I32(5))
    );

    session
        .server
        .world_mut()
        .set_field(marker, MARKER_ORIGIN, FieldValue::I32(9))
        .unwrap();
    session.tick_n(3);
    // not even a flush sends it again
    session.server.request_flush();
    session.tick();

    for object in object_chunks(&session.client(0).from_server.take()) {
        assert!(!object
            .present_fields()
            .contains(&usize::from(MARKER_ORIGIN)));
    }
    assert_eq!(
        session.client(0).client.world().field(marker, MARKER_ORIGIN),
        Some(FieldValue::I32(5))
    );
}

/// Ticks until the client sees `heat`; returns the tick index
fn ticks_until_heat(session: &mut TestSession, marker: NetId, heat: i32, limit: usize) -> Option<usize> {
    (0..limit).find(|_| {
        session.tick();
        session.client(0).client.world().field(marker, MARKER_HEAT) == Some(FieldValue::I32(heat))
    })
}

#[test]
fn field_update_rate_delays_rechecks() {
    let mut session = TestSession::new(tether_test::protocol(), 1);
    let marker = session.server.world_mut().spawn(MARKER).unwrap();
    session.connect();

    // lines the field timer up with a send
    session
        .server
        .world_mut()
        .set_field(marker, MARKER_HEAT, FieldValue::I32(1))
        .unwrap();
    assert!(ticks_until_heat(&mut session, marker, 1, 10).is_some());

    // 0.25 seconds is 5 ticks
    session
        .server
        .world_mut()
        .set_field(marker, MARKER_HEAT, FieldValue::I32(7))
        .unwrap();
    let seen_at = ticks_until_heat(&mut session, marker, 7, 10).unwrap();
    assert!((4..=5).contains(&seen_at), "seen at tick {}", seen_at);
}
