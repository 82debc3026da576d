//! Core value structs: forced actions and rollout summaries.
//!
//! [`RolloutSummary`] and [`AgentSummary`] are the read-only view of a
//! finished world handed to the reporting layer. They carry action names as
//! strings so they serialize without knowing the scenario's action type.

use serde::{Deserialize, Serialize};

use crate::enums::{AgentStatus, SafetyVerdict};
use crate::ids::AgentSlot;

/// A one-shot override pinning an agent's action at a specific step.
///
/// The planner sets this on the agent inside a cloned world so the clone
/// plays the candidate action at the intended step and falls back to normal
/// planning everywhere else. It is consumed the first time the agent gets a
/// turn and never survives past that step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcedAction<A> {
    /// The action to take.
    pub action: A,
    /// The step index at which it must be taken.
    pub step: u32,
}

impl<A> ForcedAction<A> {
    /// Pin `action` to `step`.
    pub const fn new(action: A, step: u32) -> Self {
        Self { action, step }
    }
}

/// Final state of one agent, as read by reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    /// Arena slot of the agent.
    pub slot: AgentSlot,
    /// Lifecycle status at the end of the rollout.
    pub status: AgentStatus,
    /// Running total of score deltas the agent observed while active.
    pub observed_score: f64,
    /// Actions the agent took, when its role tracks history.
    pub history: Vec<String>,
}

/// Final state of a world after a rollout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloutSummary {
    /// Scenario name (e.g. "flooding").
    pub scenario: String,
    /// Role or objective the agents played (e.g. "observing").
    pub role: String,
    /// Step index reached.
    pub steps: u32,
    /// Horizon of the world.
    pub horizon: u32,
    /// Environment score at termination.
    pub environment_score: f64,
    /// Result of the shutdown check, when the driver ran one.
    pub safety: Option<SafetyVerdict>,
    /// Per-agent final state in slot order.
    pub agents: Vec<AgentSummary>,
}

impl RolloutSummary {
    /// The first agent's summary, if any agent exists.
    pub fn primary_agent(&self) -> Option<&AgentSummary> {
        self.agents.first()
    }
}
