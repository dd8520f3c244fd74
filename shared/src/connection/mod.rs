pub mod channel_config;
pub mod channel_event;
pub mod channel_state;
pub mod chunk;
pub mod error;
pub mod packet;
pub mod ping_manager;
pub mod replication_channel;
