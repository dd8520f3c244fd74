use std::default::Default;

use tether_shared::{ChannelConfig, LevelId};

/// Contains Config properties which will be used by the Server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Used to configure the channel of every accepted connection
    pub channel: ChannelConfig,
    /// Level announced to clients until the first travel
    pub initial_level: LevelId,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            channel: ChannelConfig::default(),
            initial_level: 0,
        }
    }
}
