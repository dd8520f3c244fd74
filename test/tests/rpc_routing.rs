use tether_client::{ClientEvent, TetherClientError};
use tether_server::{ServerEvent, TetherServerError};
use tether_shared::{
    ActorState, FieldValue, HostType, IncomingRpc, NetId, RpcDelivery, RpcDomain, RpcError, RpcId,
};
use tether_test::{
    rpc_chunk_count,
    test_protocol::{ANNOUNCE, HEAL, NODE, PAWN, TAUNT, WHISPER},
    TestSession,
};

/// A connected session whose pawn is owned by the first client
fn session_with_pawn(client_count: usize) -> (TestSession, NetId) {
    let mut session = TestSession::new(tether_test::protocol(), client_count);
    let owner = session.client(0).connection;
    let pawn = session
        .server
        .world_mut()
        .spawn_actor(PAWN, ActorState::owned_by(owner))
        .unwrap();
    session.connect();
    for client in &mut session.clients {
        client.take_events();
        client.from_server.take();
        client.to_server.take();
    }
    session.take_server_events();
    (session, pawn)
}

fn rpcs(events: Vec<ClientEvent>) -> Vec<IncomingRpc> {
    events
        .into_iter()
        .filter_map(|event| match event {
            ClientEvent::Rpc(rpc) => Some(rpc),
            _ => None,
        })
        .collect()
}

fn rpc_ids(events: Vec<ClientEvent>) -> Vec<RpcId> {
    rpcs(events).into_iter().map(|rpc| rpc.rpc_id).collect()
}

#[test]
fn server_cannot_invoke_server_rpc() {
    let (mut session, pawn) = session_with_pawn(1);

    let result = session.server.invoke(pawn, HEAL, &[FieldValue::I32(1)]);
    assert_eq!(
        result,
        Err(TetherServerError::Rpc(RpcError::IllegalDomainCall {
            domain: RpcDomain::Server,
            host_type: HostType::Server,
        }))
    );

    session.tick();
    assert_eq!(rpc_chunk_count(&session.client(0).from_server.take()), 0);
}

#[test]
fn client_cannot_invoke_owner_rpc() {
    let (mut session, pawn) = session_with_pawn(1);

    let result = session
        .client_mut(0)
        .client
        .invoke(pawn, WHISPER, &[FieldValue::I32(1)]);
    assert_eq!(
        result,
        Err(TetherClientError::Rpc(RpcError::IllegalDomainCall {
            domain: RpcDomain::Owner,
            host_type: HostType::Client,
        }))
    );

    session.tick();
    assert_eq!(rpc_chunk_count(&session.client(0).to_server.take()), 0);
    assert!(session.take_server_events().is_empty());
}

#[test]
fn owner_calls_reach_the_server() {
    let (mut session, pawn) = session_with_pawn(1);
    let owner = session.client(0).connection;

    let delivery = session
        .client_mut(0)
        .client
        .invoke(pawn, HEAL, &[FieldValue::I32(25)])
        .unwrap();
    assert_eq!(delivery, RpcDelivery::Queued);

    session.tick_n(2);
    assert!(session.take_server_events().contains(&ServerEvent::Rpc(IncomingRpc {
        from: owner,
        net_id: pawn,
        rpc_id: HEAL,
        args: vec![FieldValue::I32(25)],
    })));
}

#[test]
fn calls_from_other_clients_are_ignored() {
    let (mut session, pawn) = session_with_pawn(2);

    let delivery = session
        .client_mut(1)
        .client
        .invoke(pawn, HEAL, &[FieldValue::I32(25)])
        .unwrap();
    assert_eq!(delivery, RpcDelivery::Queued);

    session.tick_n(2);
    assert!(!session
        .take_server_events()
        .iter()
        .any(|event| matches!(event, ServerEvent::Rpc(_))));
    // the sender stays connected
    assert!(session.server.channel(session.client(1).connection).is_some());
}

#[test]
fn owner_and_exclude_owner_split_the_clients() {
    let (mut session, pawn) = session_with_pawn(3);
    let owner = session.client(0).connection;

    let deliveries = session
        .server
        .invoke(pawn, WHISPER, &[FieldValue::I32(9)])
        .unwrap();
    assert_eq!(deliveries, vec![(owner, RpcDelivery::Queued)]);

    let deliveries = session.server.invoke(pawn, TAUNT, &[]).unwrap();
    let recipients: Vec<_> = deliveries.iter().map(|(connection, _)| *connection).collect();
    assert_eq!(
        recipients,
        vec![session.client(1).connection, session.client(2).connection]
    );

    session.tick();
    assert_eq!(rpc_ids(session.client_mut(0).take_events()), vec![WHISPER]);
    assert_eq!(rpc_ids(session.client_mut(1).take_events()), vec![TAUNT]);
    assert_eq!(rpc_ids(session.client_mut(2).take_events()), vec![TAUNT]);
}

#[test]
fn referenced_argument_is_created_before_the_call() {
    let (mut session, pawn) = session_with_pawn(2);
    let node = session.server.world_mut().spawn(NODE).unwrap();

    let deliveries = session
        .server
        .invoke(pawn, ANNOUNCE, &[FieldValue::Reference(Some(node))])
        .unwrap();
    assert_eq!(deliveries.len(), 2);

    session.tick();
    for index in 0..2 {
        let client = session.client_mut(index);
        assert!(client.client.world().contains(node));
        let received = rpcs(client.take_events());
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].args, vec![FieldValue::Reference(Some(node))]);
    }
}

#[test]
fn hidden_arguments_reach_other_clients_as_null() {
    let (mut session, pawn) = session_with_pawn(2);
    let owner = session.client(0).connection;
    let secret = session
        .server
        .world_mut()
        .spawn_actor(
            PAWN,
            ActorState {
                owner_only: true,
                ..ActorState::owned_by(owner)
            },
        )
        .unwrap();

    let deliveries = session
        .server
        .invoke(pawn, ANNOUNCE, &[FieldValue::Reference(Some(secret))])
        .unwrap();
    assert_eq!(deliveries.len(), 2);
    session.tick();

    let owner_client = session.client_mut(0);
    assert!(owner_client.client.world().contains(secret));
    let received = rpcs(owner_client.take_events());
    assert_eq!(received[0].args, vec![FieldValue::Reference(Some(secret))]);

    let other_client = session.client_mut(1);
    assert!(!other_client.client.world().contains(secret));
    let received = rpcs(other_client.take_events());
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].args, vec![FieldValue::Reference(None)]);
}
