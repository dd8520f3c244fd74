use tether_shared::ChannelConfig;

/// Contains Config properties which will be used by a Client
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    /// Used to configure the channel to the server
    pub channel: ChannelConfig,
}
