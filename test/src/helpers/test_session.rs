use std::sync::Arc;

use log::info;

use tether_client::{Client, ClientConfig, ClientEvent};
use tether_server::{Server, ServerConfig, ServerEvent};
use tether_shared::{ChannelConfig, ConnectionId, LoopbackTransport, Protocol};

use crate::helpers::recording_transport::{PacketLog, RecordingTransport};

/// Seconds advanced by one `TestSession::tick`
pub const DT: f32 = 0.05;

/// A client of a `TestSession`, with everything it reported so far
pub struct TestClient {
    /// The id the server gave this client
    pub connection: ConnectionId,
    pub client: Client,
    pub events: Vec<ClientEvent>,
    /// Packets the server sent to this client
    pub from_server: PacketLog,
    /// Packets this client sent to the server
    pub to_server: PacketLog,
    /// Set to stop ticking this client, as if it hung
    pub frozen: bool,
}

impl TestClient {
    pub fn take_events(&mut self) -> Vec<ClientEvent> {
        std::mem::take(&mut self.events)
    }
}

/// A server and its clients joined by loopback transports.
///
/// Clients load whatever level they are asked to as soon as they are asked.
pub struct TestSession {
    pub server: Server,
    pub server_events: Vec<ServerEvent>,
    pub clients: Vec<TestClient>,
    pub server_frozen: bool,
}

impl TestSession {
    pub fn new(protocol: Arc<Protocol>, client_count: usize) -> Self {
        Self::with_channel_config(protocol, client_count, ChannelConfig::default())
    }

    pub fn with_channel_config(protocol: Arc<Protocol>, client_count: usize, channel: ChannelConfig) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let config = ServerConfig {
            channel: channel.clone(),
            ..ServerConfig::default()
        };
        let mut server = Server::new(config, protocol.clone());

        let clients = (0..client_count)
            .map(|_| {
                let (server_end, client_end) = LoopbackTransport::pair();
                let (server_end, from_server) = RecordingTransport::new(server_end);
                let (client_end, to_server) = RecordingTransport::new(client_end);
                let connection = server.accept(server_end);
                let client = Client::new(
                    ClientConfig {
                        channel: channel.clone(),
                    },
                    protocol.clone(),
                    client_end,
                );
                TestClient {
                    connection,
                    client,
                    events: Vec::new(),
                    from_server,
                    to_server,
                    frozen: false,
                }
            })
            .collect();

        Self {
            server,
            server_events: Vec::new(),
            clients,
            server_frozen: false,
        }
    }

    /// Ticks until every client is synced and has applied the server's
    /// first sweep
    pub fn connect(&mut self) {
        for ticks in 1..=10 {
            self.tick();
            if self.all_synced() {
                info!("{} clients synced after {} ticks", self.clients.len(), ticks);
                return;
            }
        }
        panic!("clients never synced");
    }

    fn all_synced(&self) -> bool {
        self.clients.iter().all(|client| {
            client.client.channel().state().is_synced()
                && self
                    .server
                    .channel(client.connection)
                    .is_some_and(|channel| channel.state().is_synced())
        })
    }

    /// One server tick, then one tick of every client
    pub fn tick(&mut self) {
        if !self.server_frozen {
            self.server.tick(DT);
            self.server_events.extend(self.server.take_events());
        }

        for client in self.clients.iter_mut().filter(|client| !client.frozen) {
            client.client.tick(DT);
            for event in client.client.take_events() {
                if let ClientEvent::TravelRequested(level) = event {
                    client.client.finish_loading(level);
                }
                client.events.push(event);
            }
        }
    }

    pub fn tick_n(&mut self, count: usize) {
        for _ in 0..count {
            self.tick();
        }
    }

    pub fn client(&self, index: usize) -> &TestClient {
        &self.clients[index]
    }

    pub fn client_mut(&mut self, index: usize) -> &mut TestClient {
        &mut self.clients[index]
    }

    pub fn take_server_events(&mut self) -> Vec<ServerEvent> {
        std::mem::take(&mut self.server_events)
    }
}
