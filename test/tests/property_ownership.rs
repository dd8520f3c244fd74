/// PROPERTY-BASED TESTS: owner-only fields
///
/// A field replicated only to its owner appears in the creation bitmap on
/// the owner's channel and nowhere else.
use proptest::prelude::*;
use tether_shared::{
    ActorState, ChannelConfig, ConnectionId, HostType, ObjectWorld, ReplicationChannel,
};
use tether_test::{
    object_chunks,
    test_protocol::{PAWN, PAWN_SECRET},
};

/// Present fields of the pawn's creation chunk on the channel to `channel_id`
fn creation_fields(owner_id: u64, channel_id: u64) -> Vec<usize> {
    let protocol = tether_test::protocol();
    let config = ChannelConfig::default();

    let mut world = ObjectWorld::new(protocol.clone(), HostType::Server);
    world
        .spawn_actor(PAWN, ActorState::owned_by(ConnectionId(owner_id)))
        .unwrap();

    let mut server = ReplicationChannel::new(
        protocol.clone(),
        config.clone(),
        HostType::Server,
        ConnectionId(channel_id),
    );
    let mut client = ReplicationChannel::new(protocol.clone(), config, HostType::Client, ConnectionId(0));
    let client_world = ObjectWorld::new(protocol, HostType::Client);

    server.begin_travel(0);
    client.report_loaded_level(0);
    for packet in client.send_packets(&client_world, 0.1).unwrap() {
        server.receive_packet(&mut world, &packet).unwrap();
    }
    assert!(server.state().is_synced());

    let objects = object_chunks(&server.send_packets(&world, 0.1).unwrap());
    assert_eq!(objects.len(), 1);
    assert!(objects[0].header.create.is_some());
    objects[0].present_fields()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_owner_only_field_reaches_only_the_owner(
        owner_id in 0u64..6,
        channel_id in 0u64..6,
    ) {
        let fields = creation_fields(owner_id, channel_id);
        let has_secret = fields.contains(&usize::from(PAWN_SECRET));
        prop_assert_eq!(has_secret, owner_id == channel_id);
        prop_assert_eq!(fields.len(), if owner_id == channel_id { 4 } else { 3 });
    }
}
