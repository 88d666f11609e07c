use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::NodeId;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub u32);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link#{}", self.0)
    }
}

/// Directed edge from an output slot to an input slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub id: LinkId,
    pub from: NodeId,
    pub from_slot: usize,
    pub to: NodeId,
    pub to_slot: usize,
}

impl Link {
    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }
}
