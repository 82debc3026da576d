//! Shared type definitions for the Foresight counterfactual planner.
//!
//! This crate holds the small value types that flow between the planner core,
//! the scenario worlds, and the reporting driver. Nothing here depends on a
//! concrete scenario.
//!
//! # Modules
//!
//! - [`ids`] -- [`AgentSlot`], the arena index an agent uses to find itself
//!   inside its owning world
//! - [`enums`] -- Agent lifecycle status and safety verdicts
//! - [`structs`] -- Forced actions and serializable rollout summaries

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AgentStatus, SafetyVerdict};
pub use ids::AgentSlot;
pub use structs::{AgentSummary, ForcedAction, RolloutSummary};
