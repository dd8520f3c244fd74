/// Policy deciding on which channels, and when, a field may be sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ReplicationCondition {
    #[default]
    Always,
    /// Only in the creation chunk
    InitialOnly,
    /// Only to the owning connection
    OwnerOnly,
    /// To everyone except the owning connection
    SkipOwner,
    InitialOrOwner,
    InitialOwnerOnly,
}

impl ReplicationCondition {
    pub fn allows(&self, has_ever_sent: bool, is_owner: bool) -> bool {
        match self {
            ReplicationCondition::Always => true,
            ReplicationCondition::InitialOnly => !has_ever_sent,
            ReplicationCondition::OwnerOnly => is_owner,
            ReplicationCondition::SkipOwner => !is_owner,
            ReplicationCondition::InitialOrOwner => !has_ever_sent || is_owner,
            ReplicationCondition::InitialOwnerOnly => !has_ever_sent && is_owner,
        }
    }
}
