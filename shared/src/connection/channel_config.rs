use std::default::Default;

use crate::constants::MAX_PACKET_BYTES;

/// Contains Config properties which will be used by a Replication Channel
#[derive(Clone, Debug)]
pub struct ChannelConfig {
    /// Packets are split before they would exceed this many bytes
    pub max_packet_bytes: usize,
    /// Seconds between two pings
    pub ping_interval: f32,
    /// Number of round-trip samples averaged into the reported RTT
    pub rtt_sample_count: usize,
    /// Seconds without hearing from the remote peer before the channel is
    /// reported as timed out
    pub timeout: f32,
    /// Seconds a received reference may wait for its referent before it is
    /// dropped
    pub pending_reference_ttl: f32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_packet_bytes: MAX_PACKET_BYTES,
            ping_interval: 1.0,
            rtt_sample_count: 8,
            timeout: 10.0,
            pending_reference_ttl: 60.0,
        }
    }
}
