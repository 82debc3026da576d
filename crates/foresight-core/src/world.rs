//! World state and the scenario contract.
//!
//! A [`WorldState`] bundles a scenario's environment fields with the step
//! counter, the fixed horizon, and the arena of agents. It is the substrate
//! for counterfactual evaluation: cloning a world yields a fully independent
//! copy that can be rolled forward without touching the original.
//!
//! # Arena model
//!
//! Agents are stored in a `Vec` and identified by [`AgentSlot`]. Effect
//! procedures receive `(world, slot)` and reach the acting agent through
//! [`WorldState::agent_mut`]. Cloning relinks every agent to its index, so a
//! clone's agents always point into the clone.
//!
//! # Mid-step cursor
//!
//! The world remembers whose turn it is within the current step and the
//! score when the step began. A clone taken during agent `k`'s turn resumes
//! that same step at agent `k`; agents earlier in the order do not act twice.

use std::fmt;
use std::sync::Arc;

use foresight_types::{AgentSlot, AgentSummary, RolloutSummary, SafetyVerdict};

use crate::action::ActionTable;
use crate::agent::Agent;
use crate::belief::Belief;
use crate::error::RolloutError;

/// The environment half of a world, plus the role definition of its agents.
pub trait Scenario: Clone + fmt::Debug + Sized + 'static {
    /// Role-specific private state carried by each agent.
    type AgentState: Clone + fmt::Debug;

    /// The closed enumeration of action identifiers for this role.
    type Action: Copy + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// Short scenario name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Build the action table for this scenario's agents.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the table is inconsistent.
    fn action_table(&self) -> Result<ActionTable<Self>, RolloutError>;

    /// The scalar environment score.
    fn score(&self) -> f64;

    /// World-level effects applied after every agent has acted in a step.
    ///
    /// The step index still holds the step being completed.
    ///
    /// # Errors
    ///
    /// Propagates errors from effects the scenario triggers.
    fn scripted_effects(_world: &mut WorldState<Self>) -> Result<(), RolloutError> {
        Ok(())
    }
}

/// A scenario with a hidden environment parameter agents hold beliefs about.
pub trait HiddenParameter: Scenario {
    /// The possible values of the hidden parameter.
    type Hypothesis: Copy + Ord + fmt::Debug;

    /// The actual value held by this world.
    fn hypothesis(&self) -> Self::Hypothesis;

    /// Overwrite the hidden value.
    fn fix_hypothesis(&mut self, hypothesis: Self::Hypothesis);

    /// The score this world would have if `hypothesis` were the truth.
    fn score_under(&self, hypothesis: Self::Hypothesis) -> f64;

    /// The belief an agent of this scenario holds.
    fn belief(agent: &Agent<Self>) -> &Belief<Self::Hypothesis>;
}

/// A cloneable simulation world.
#[derive(Debug)]
pub struct WorldState<S: Scenario> {
    /// Scenario-specific environment fields.
    pub env: S,
    pub(crate) step_index: u32,
    horizon: u32,
    pub(crate) turn: usize,
    pub(crate) step_baseline: f64,
    depth: u32,
    pub(crate) agents: Vec<Agent<S>>,
    table: Arc<ActionTable<S>>,
}

impl<S: Scenario> WorldState<S> {
    /// Create a world with no agents at step 0.
    ///
    /// # Errors
    ///
    /// Returns [`RolloutError::InvalidHorizon`] for a zero horizon, or the
    /// scenario's error if its action table is inconsistent.
    pub fn new(env: S, horizon: u32) -> Result<Self, RolloutError> {
        if horizon == 0 {
            return Err(RolloutError::InvalidHorizon { horizon });
        }
        let table = Arc::new(env.action_table()?);
        let step_baseline = env.score();
        Ok(Self {
            env,
            step_index: 0,
            horizon,
            turn: 0,
            step_baseline,
            depth: 0,
            agents: Vec::new(),
            table,
        })
    }

    /// Add an agent to the arena and link it to its slot.
    ///
    /// Agents spawned while a step is running still get a turn in that step.
    pub fn spawn(&mut self, mut agent: Agent<S>) -> AgentSlot {
        let slot = AgentSlot::new(self.agents.len());
        agent.relink(slot);
        self.agents.push(agent);
        slot
    }

    /// Number of completed steps.
    pub const fn step_index(&self) -> u32 {
        self.step_index
    }

    /// Total number of steps in this world's life.
    pub const fn horizon(&self) -> u32 {
        self.horizon
    }

    /// Steps left before the horizon.
    pub const fn remaining_steps(&self) -> u32 {
        self.horizon.saturating_sub(self.step_index)
    }

    /// Whether the world has reached its horizon.
    pub const fn is_finished(&self) -> bool {
        self.step_index >= self.horizon
    }

    /// How many counterfactual clones deep this world is. Zero is real.
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Whether this world is a counterfactual clone.
    pub const fn is_counterfactual(&self) -> bool {
        self.depth > 0
    }

    /// All agents in slot order.
    pub fn agents(&self) -> &[Agent<S>] {
        &self.agents
    }

    /// The agent at `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`RolloutError::AgentNotFound`] for an empty slot.
    pub fn agent(&self, slot: AgentSlot) -> Result<&Agent<S>, RolloutError> {
        self.agents
            .get(slot.index())
            .ok_or(RolloutError::AgentNotFound(slot))
    }

    /// Mutable access to the agent at `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`RolloutError::AgentNotFound`] for an empty slot.
    pub fn agent_mut(&mut self, slot: AgentSlot) -> Result<&mut Agent<S>, RolloutError> {
        self.agents
            .get_mut(slot.index())
            .ok_or(RolloutError::AgentNotFound(slot))
    }

    /// The action table shared by this world's agents.
    pub fn table(&self) -> &ActionTable<S> {
        &self.table
    }

    /// The environment score.
    pub fn score(&self) -> f64 {
        self.env.score()
    }

    /// Take `action` for the agent at `slot`: run its effect, then record it
    /// in the agent's history when the role tracks history.
    ///
    /// # Errors
    ///
    /// Returns [`RolloutError::UnknownAction`] for an unregistered action,
    /// or any error raised by the effect.
    pub fn take_action(&mut self, slot: AgentSlot, action: S::Action) -> Result<(), RolloutError> {
        self.invoke(slot, action)?;
        if self.table.tracks_history() {
            self.agent_mut(slot)?.record(action);
        }
        Ok(())
    }

    /// Run `action`'s effect for the agent at `slot` without recording it.
    ///
    /// # Errors
    ///
    /// Returns [`RolloutError::UnknownAction`] for an unregistered action,
    /// or any error raised by the effect.
    pub fn invoke(&mut self, slot: AgentSlot, action: S::Action) -> Result<(), RolloutError> {
        let effect = self.table.effect(action)?;
        effect(self, slot)
    }

    /// Clone this world for a counterfactual evaluation.
    #[must_use]
    pub fn counterfactual(&self) -> Self {
        let mut copy = self.clone();
        copy.depth = self.depth.saturating_add(1);
        copy
    }

    /// Check that every agent's back-reference matches its arena position.
    ///
    /// # Errors
    ///
    /// Returns [`RolloutError::BrokenLink`] for the first mismatch.
    pub fn check_links(&self) -> Result<(), RolloutError> {
        for (index, agent) in self.agents.iter().enumerate() {
            if agent.slot().index() != index {
                return Err(RolloutError::BrokenLink {
                    index,
                    linked: agent.slot(),
                });
            }
        }
        Ok(())
    }

    /// Summarize the world for reporting.
    pub fn summary(&self, role: &str, safety: Option<SafetyVerdict>) -> RolloutSummary {
        RolloutSummary {
            scenario: self.env.name().to_owned(),
            role: role.to_owned(),
            steps: self.step_index,
            horizon: self.horizon,
            environment_score: self.score(),
            safety,
            agents: self
                .agents
                .iter()
                .map(|agent| AgentSummary {
                    slot: agent.slot(),
                    status: agent.status(),
                    observed_score: agent.observed_score(),
                    history: agent.history().iter().map(ToString::to_string).collect(),
                })
                .collect(),
        }
    }
}

impl<S: Scenario> Clone for WorldState<S> {
    /// Deep copy: environment, counters, and every agent are copied; agents
    /// are relinked to their positions in the copy. The action table is
    /// immutable and shared.
    fn clone(&self) -> Self {
        let agents = self
            .agents
            .iter()
            .enumerate()
            .map(|(index, agent)| {
                let mut copy = agent.clone();
                copy.relink(AgentSlot::new(index));
                copy
            })
            .collect();
        Self {
            env: self.env.clone(),
            step_index: self.step_index,
            horizon: self.horizon,
            turn: self.turn,
            step_baseline: self.step_baseline,
            depth: self.depth,
            agents,
            table: Arc::clone(&self.table),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use foresight_types::AgentStatus;

    use super::*;
    use crate::testing::{Tally, TallyAction, tally_agent, tally_world};

    #[test]
    fn zero_horizon_is_rejected() {
        let result = WorldState::new(Tally::default(), 0);
        assert!(matches!(result, Err(RolloutError::InvalidHorizon { horizon: 0 })));
    }

    #[test]
    fn spawn_assigns_sequential_slots() {
        let mut world = WorldState::new(Tally::default(), 3).unwrap();
        let a = world.spawn(tally_agent());
        let b = world.spawn(tally_agent());
        assert_eq!(a, AgentSlot::new(0));
        assert_eq!(b, AgentSlot::new(1));
        assert!(world.check_links().is_ok());
        assert!(world.agent(AgentSlot::new(2)).is_err());
    }

    #[test]
    fn clone_is_independent_of_source() {
        let world = tally_world(4);
        let before = format!("{world:?}");

        let mut copy = world.clone();
        copy.take_action(AgentSlot::new(0), TallyAction::Bump).unwrap();
        copy.take_action(AgentSlot::new(0), TallyAction::Halt).unwrap();
        copy.agent_mut(AgentSlot::new(0))
            .unwrap()
            .force(TallyAction::Nudge, 1);

        assert_eq!(format!("{world:?}"), before);
        assert_eq!(world.score(), 0.0);
        assert_eq!(world.agent(AgentSlot::new(0)).unwrap().status(), AgentStatus::Active);
        assert_eq!(copy.score(), 1.0);
        assert_eq!(copy.agent(AgentSlot::new(0)).unwrap().status(), AgentStatus::Inactive);
    }

    #[test]
    fn source_mutation_does_not_leak_into_clone() {
        let mut world = tally_world(4);
        let copy = world.clone();
        let before = format!("{copy:?}");

        world.take_action(AgentSlot::new(0), TallyAction::Bump).unwrap();
        world.simulate().unwrap();

        assert_eq!(format!("{copy:?}"), before);
        assert_eq!(copy.step_index(), 0);
    }

    #[test]
    fn counterfactual_increments_depth() {
        let world = tally_world(2);
        let trial = world.counterfactual();
        assert!(!world.is_counterfactual());
        assert!(trial.is_counterfactual());
        assert_eq!(trial.counterfactual().depth(), 2);
    }

    #[test]
    fn clone_relinks_back_references() {
        let mut world = tally_world(2);
        world.spawn(tally_agent());
        let copy = world.clone();
        assert!(copy.check_links().is_ok());
        for (index, agent) in copy.agents().iter().enumerate() {
            assert_eq!(agent.slot().index(), index);
        }
    }

    #[test]
    fn mislinked_agent_is_reported() {
        let mut world = tally_world(2);
        world.spawn(tally_agent());
        world.agents.get_mut(1).unwrap().relink(AgentSlot::new(0));

        let err = world.check_links().unwrap_err();
        assert!(matches!(err, RolloutError::BrokenLink { index: 1, .. }));
        let err = crate::planner::rank_candidates(&world, AgentSlot::new(0)).unwrap_err();
        assert!(matches!(err, RolloutError::BrokenLink { index: 1, .. }));
    }

    #[test]
    fn summary_reads_agent_fields() {
        let mut world = tally_world(2);
        world.simulate().unwrap();
        let summary = world.summary("direct", None);
        assert_eq!(summary.scenario, "tally");
        assert_eq!(summary.steps, 2);
        assert_eq!(summary.agents.len(), 1);
        assert_eq!(summary.environment_score, world.score());
    }
}
