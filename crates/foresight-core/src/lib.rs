//! World cloning, rollout engine, counterfactual planner, and objective
//! strategies for the Foresight simulation.
//!
//! Agents in this crate decide by brute force: for each candidate action the
//! planner clones the whole world, pins the candidate as a one-shot forced
//! action on the cloned agent, rolls the clone forward to the horizon, and
//! scores the result with the agent's objective. The best candidate is then
//! taken on the real world. Every agent inside a clone plans the same way, so
//! the search recurses until each clone reaches its own horizon.
//!
//! # Modules
//!
//! - [`action`] -- [`ActionTable`]: action identifiers mapped to effect procedures
//! - [`agent`] -- [`Agent`]: lifecycle, forced action, history, observed tally
//! - [`belief`] -- [`Belief`]: validated probability weights over hypotheses
//! - [`config`] -- YAML configuration ([`SimulationConfig`])
//! - [`error`] -- [`RolloutError`] and its configuration/logic classification
//! - [`objective`] -- Pluggable scoring strategies and the [`Trial`] they score
//! - [`planner`] -- Candidate ranking and action selection
//! - [`rollout`] -- `step` and `simulate` on a [`WorldState`]
//! - [`safety`] -- Corrigibility and non-manipulation objective wrappers
//! - [`world`] -- [`WorldState`] and the [`Scenario`] contract
//!
//! [`ActionTable`]: action::ActionTable
//! [`Agent`]: agent::Agent
//! [`Belief`]: belief::Belief
//! [`SimulationConfig`]: config::SimulationConfig
//! [`RolloutError`]: error::RolloutError
//! [`Trial`]: objective::Trial
//! [`WorldState`]: world::WorldState
//! [`Scenario`]: world::Scenario

pub mod action;
pub mod agent;
pub mod belief;
pub mod config;
pub mod error;
pub mod objective;
pub mod planner;
pub mod rollout;
pub mod safety;
pub mod world;

#[cfg(test)]
pub(crate) mod testing;

// Re-export primary types at crate root.
pub use action::{ActionTable, ActionTableBuilder, Effect};
pub use agent::{Agent, Controller};
pub use belief::Belief;
pub use config::{ConfigError, ReportFormat, SimulationConfig};
pub use error::{ErrorClass, RolloutError};
pub use objective::{
    BeliefWeighted, CurrentBelief, EnvironmentScore, Objective, ObjectiveExt, ObservedScore, Trial,
};
pub use planner::{CandidateScore, choose_action, rank_candidates, select_action};
pub use safety::{
    Corrigible, MANIPULATION_PENALTY, NonManipulative, VIOLATION_SCORE, shutdown_verdict,
};
pub use world::{HiddenParameter, Scenario, WorldState};
