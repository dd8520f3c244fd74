use tether_shared::{ChannelConfig, ChunkKind, FieldValue, NetId};
use tether_test::{
    chunk_kinds, object_chunks,
    test_protocol::{NODE, NODE_LABEL, NODE_VALUE},
    TestSession,
};

const NODE_COUNT: usize = 60;

fn session_with_nodes(max_packet_bytes: usize) -> (TestSession, Vec<NetId>) {
    let config = ChannelConfig {
        max_packet_bytes,
        ..ChannelConfig::default()
    };
    let mut session = TestSession::with_channel_config(tether_test::protocol(), 1, config);
    let world = session.server.world_mut();
    let nodes = (0..NODE_COUNT)
        .map(|index| {
            let node = world.spawn(NODE).unwrap();
            world.set_field(node, NODE_VALUE, FieldValue::I32(index as i32 * 1000)).unwrap();
            world
                .set_field(node, NODE_LABEL, FieldValue::String(format!("node number {:04}", index)))
                .unwrap();
            node
        })
        .collect();
    session.connect();
    (session, nodes)
}

fn client_values(session: &TestSession, nodes: &[NetId]) -> Vec<(Option<FieldValue>, Option<FieldValue>)> {
    let world = session.client(0).client.world();
    nodes
        .iter()
        .map(|node| (world.field(*node, NODE_VALUE), world.field(*node, NODE_LABEL)))
        .collect()
}

#[test]
fn small_packets_carry_the_same_state() {
    let (small, nodes) = session_with_nodes(256);
    let (large, _) = session_with_nodes(64 * 1024);

    let small_packets = small.client(0).from_server.packets();
    assert!(small_packets.iter().all(|packet| packet.len() <= 256));
    let carrying_objects = small_packets
        .iter()
        .filter(|packet| chunk_kinds(std::slice::from_ref(*packet)).contains(&ChunkKind::ObjectData))
        .count();
    assert!(carrying_objects > 1);
    assert_eq!(object_chunks(&small_packets).len(), NODE_COUNT);

    let large_packets = large.client(0).from_server.packets();
    let carrying_objects = large_packets
        .iter()
        .filter(|packet| chunk_kinds(std::slice::from_ref(*packet)).contains(&ChunkKind::ObjectData))
        .count();
    assert_eq!(carrying_objects, 1);

    assert_eq!(client_values(&small, &nodes), client_values(&large, &nodes));
    assert_eq!(
        client_values(&small, &nodes)[7],
        (
            Some(FieldValue::I32(7000)),
            Some(FieldValue::String("node number 0007".to_string()))
        )
    );
}
