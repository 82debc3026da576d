//! Error types for the `foresight-core` crate.
//!
//! Nothing in the planner is retryable: every failure is either a
//! configuration error (the world, table, or belief was built wrong) or a
//! logic violation (an invariant the design should make unreachable). Both
//! are surfaced to the caller of `simulate()` / `select_action()` at once,
//! since a half-applied rollout would silently skew candidate comparisons.

use foresight_types::AgentSlot;

/// Broad classification of a [`RolloutError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The world, action table, or belief was set up inconsistently.
    Configuration,
    /// An internal invariant of the rollout was broken.
    LogicViolation,
}

/// Errors that can occur while building or rolling out a world.
#[derive(Debug, thiserror::Error)]
pub enum RolloutError {
    /// A world was created with a horizon of zero steps.
    #[error("invalid horizon {horizon}: a world needs at least one step")]
    InvalidHorizon {
        /// The rejected horizon.
        horizon: u32,
    },

    /// An action identifier has no registered effect.
    #[error("unknown action: {action}")]
    UnknownAction {
        /// Debug rendering of the action identifier.
        action: String,
    },

    /// The action table lists no candidate actions for the planner.
    #[error("action table has no candidate actions")]
    EmptyCandidates,

    /// A candidate action was listed more than once.
    #[error("duplicate candidate action: {action}")]
    DuplicateCandidate {
        /// Debug rendering of the repeated action.
        action: String,
    },

    /// A belief's weights are negative, non-finite, or do not sum to 1.
    #[error("invalid belief: {reason}")]
    InvalidBelief {
        /// Description of what is wrong with the weights.
        reason: String,
    },

    /// No agent occupies the given slot.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentSlot),

    /// An agent's back-reference does not match its arena position.
    #[error("agent at index {index} is linked to {linked}")]
    BrokenLink {
        /// Position of the agent in the arena.
        index: usize,
        /// Slot the agent believes it occupies.
        linked: AgentSlot,
    },

    /// A manipulation check needs an idle action but the table has none.
    #[error("action table has no idle action")]
    MissingIdleAction,

    /// A corrigibility check needs a shutdown action but the table has none.
    #[error("action table has no shutdown action")]
    MissingShutdownAction,

    /// A manipulation check needs action history but the table does not track it.
    #[error("action table does not track agent history")]
    UntrackedHistory,

    /// A pending forced action was found at a step other than its target.
    #[error("{slot} has a forced action for step {expected} but the world is at step {actual}")]
    ForcedActionStepMismatch {
        /// The agent holding the stale forced action.
        slot: AgentSlot,
        /// The step the forced action was pinned to.
        expected: u32,
        /// The step the world is actually at.
        actual: u32,
    },

    /// `step()` was called on a world that already reached its horizon.
    #[error("cannot step past the horizon (step {step}, horizon {horizon})")]
    StepPastHorizon {
        /// Current step index.
        step: u32,
        /// The world's horizon.
        horizon: u32,
    },

    /// Every candidate scored negative infinity or NaN.
    #[error("no viable action for {slot}")]
    NoViableAction {
        /// The agent that could not choose.
        slot: AgentSlot,
    },

    /// A checked counter operation overflowed.
    #[error("arithmetic overflow: {context}")]
    Arithmetic {
        /// What was being computed.
        context: String,
    },
}

impl RolloutError {
    /// Classify the error as a configuration error or a logic violation.
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidHorizon { .. }
            | Self::UnknownAction { .. }
            | Self::EmptyCandidates
            | Self::DuplicateCandidate { .. }
            | Self::InvalidBelief { .. }
            | Self::AgentNotFound(_)
            | Self::BrokenLink { .. }
            | Self::MissingIdleAction
            | Self::MissingShutdownAction
            | Self::UntrackedHistory => ErrorClass::Configuration,
            Self::ForcedActionStepMismatch { .. }
            | Self::StepPastHorizon { .. }
            | Self::NoViableAction { .. }
            | Self::Arithmetic { .. } => ErrorClass::LogicViolation,
        }
    }

    /// Build an [`UnknownAction`](Self::UnknownAction) from any debuggable action.
    pub fn unknown_action(action: &impl core::fmt::Debug) -> Self {
        Self::UnknownAction {
            action: format!("{action:?}"),
        }
    }
}
