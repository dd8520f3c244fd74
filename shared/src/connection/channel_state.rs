/// Lifecycle of a Replication Channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelState {
    /// Waiting for the remote peer to report the authority's level
    Handshaking,
    /// Both sides agree on the level; replication flows
    Synced,
    /// A level transition is underway; only keepalive traffic is sent
    Traveling,
    /// The connection is closing; nothing more is sent or accepted
    TornDown,
}

impl ChannelState {
    pub fn is_synced(&self) -> bool {
        *self == ChannelState::Synced
    }

    pub fn is_torn_down(&self) -> bool {
        *self == ChannelState::TornDown
    }
}
