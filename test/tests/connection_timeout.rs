use tether_client::ClientEvent;
use tether_server::ServerEvent;
use tether_shared::DisconnectReason;
use tether_test::TestSession;

// the default timeout is 10 seconds; 250 ticks of 50ms is 12.5
const SILENT_TICKS: usize = 250;

#[test]
fn server_drops_a_silent_client() {
    let mut session = TestSession::new(tether_test::protocol(), 2);
    session.connect();
    let silent = session.client(0).connection;
    let alive = session.client(1).connection;

    session.client_mut(0).frozen = true;
    session.tick_n(SILENT_TICKS);

    assert!(session.take_server_events().contains(&ServerEvent::Disconnected {
        connection: silent,
        reason: DisconnectReason::Timeout,
    }));
    assert!(session.server.channel(silent).is_none());
    assert!(session.server.channel(alive).is_some());
    assert!(session.client(1).client.is_connected());
}

#[test]
fn client_gives_up_on_a_silent_server() {
    let mut session = TestSession::new(tether_test::protocol(), 1);
    session.connect();
    session.client_mut(0).take_events();

    session.server_frozen = true;
    session.tick_n(SILENT_TICKS);

    assert!(!session.client(0).client.is_connected());
    assert_eq!(
        session.client_mut(0).take_events(),
        vec![ClientEvent::Disconnected(DisconnectReason::Timeout)]
    );
}

#[test]
fn pings_keep_an_idle_connection_alive() {
    let mut session = TestSession::new(tether_test::protocol(), 1);
    session.connect();

    session.tick_n(SILENT_TICKS);

    assert!(session.client(0).client.is_connected());
    assert!(session.server.channel(session.client(0).connection).is_some());
    assert!(session.server.channel(session.client(0).connection).unwrap().average_rtt().is_some());
}
