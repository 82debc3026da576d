//! Arena identifiers.
//!
//! A world exclusively owns its agents in an ordered arena. Agents refer back
//! to their world through an [`AgentSlot`] rather than a pointer, so a cloned
//! world can relink every agent by position and no clone ever aliases its
//! source.

use serde::{Deserialize, Serialize};

/// Position of an agent inside its world's agent arena.
///
/// Slots are assigned by the world when an agent is spawned and never change
/// afterwards; agents are never removed from the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentSlot(pub usize);

impl AgentSlot {
    /// Create a slot for the given arena index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the arena index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl core::fmt::Display for AgentSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

impl From<usize> for AgentSlot {
    fn from(index: usize) -> Self {
        Self(index)
    }
}
