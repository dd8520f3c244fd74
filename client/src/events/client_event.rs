use tether_shared::{ChannelEvent, ClassId, DisconnectReason, IncomingRpc, LevelId, NetId};

#[derive(Clone, Debug, PartialEq)]
pub enum ClientEvent {
    Created { net_id: NetId, class_id: ClassId },
    Destroyed(NetId),
    /// The server stopped updating this object; the local copy stays
    TornOff(NetId),
    RelevancyChanged { net_id: NetId, relevant: bool },
    /// Load `level`, then call `Client::finish_loading`
    TravelRequested(LevelId),
    Synced(LevelId),
    Rpc(IncomingRpc),
    Disconnected(DisconnectReason),
}

impl From<ChannelEvent> for ClientEvent {
    fn from(event: ChannelEvent) -> Self {
        match event {
            ChannelEvent::ObjectCreated { net_id, class_id } => ClientEvent::Created { net_id, class_id },
            ChannelEvent::ObjectDestroyed(net_id) => ClientEvent::Destroyed(net_id),
            ChannelEvent::TornOff(net_id) => ClientEvent::TornOff(net_id),
            ChannelEvent::RelevancyChanged { net_id, relevant } => {
                ClientEvent::RelevancyChanged { net_id, relevant }
            }
            ChannelEvent::Rpc(rpc) => ClientEvent::Rpc(rpc),
            ChannelEvent::TravelRequested(level) => ClientEvent::TravelRequested(level),
            ChannelEvent::Synced(level) => ClientEvent::Synced(level),
        }
    }
}
