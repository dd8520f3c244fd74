/// Dense, reusable identifier of a replicated object on one authority
pub type NetId = u16;
/// Identifies a registered class schema
pub type ClassId = i32;
pub type RpcId = u16;
pub type FieldIndex = u8;
pub type LevelId = u32;

/// Identifies one remote connection from the point of view of a host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostType {
    /// The authority
    Server,
    /// A subordinate peer
    Client,
}

impl HostType {
    pub fn invert(self) -> Self {
        match self {
            HostType::Server => HostType::Client,
            HostType::Client => HostType::Server,
        }
    }

    pub fn is_authority(self) -> bool {
        self == HostType::Server
    }
}
