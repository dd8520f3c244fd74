use std::collections::VecDeque;

use crate::{constants::NO_OUTER, types::NetId, world::error::WorldError};

/// Hands out dense network ids and recycles released ones in FIFO order.
///
/// `NO_OUTER` is never handed out.
pub struct NetIdPool {
    next_fresh: u32,
    released: VecDeque<NetId>,
}

impl NetIdPool {
    pub fn new() -> Self {
        Self {
            next_fresh: 0,
            released: VecDeque::new(),
        }
    }

    pub fn allocate(&mut self) -> Result<NetId, WorldError> {
        if let Some(id) = self.released.pop_front() {
            return Ok(id);
        }
        if self.next_fresh >= u32::from(NO_OUTER) {
            return Err(WorldError::IdPoolExhausted);
        }
        let id = self.next_fresh as NetId;
        self.next_fresh += 1;
        Ok(id)
    }

    pub fn release(&mut self, id: NetId) {
        self.released.push_back(id);
    }
}

impl Default for NetIdPool {
    fn default() -> Self {
        Self::new()
    }
}
