use std::{collections::BTreeSet, fmt, sync::Arc};

use crate::types::ConnectionId;

/// Per-connection visibility predicate of an actor.
#[derive(Clone, Default)]
pub enum Relevancy {
    #[default]
    Always,
    Never,
    Connections(BTreeSet<ConnectionId>),
    Custom(Arc<dyn Fn(ConnectionId) -> bool + Send + Sync>),
}

impl Relevancy {
    pub fn is_relevant_to(&self, connection: ConnectionId) -> bool {
        match self {
            Relevancy::Always => true,
            Relevancy::Never => false,
            Relevancy::Connections(set) => set.contains(&connection),
            Relevancy::Custom(predicate) => predicate(connection),
        }
    }
}

impl fmt::Debug for Relevancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relevancy::Always => write!(f, "Always"),
            Relevancy::Never => write!(f, "Never"),
            Relevancy::Connections(set) => f.debug_tuple("Connections").field(set).finish(),
            Relevancy::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
