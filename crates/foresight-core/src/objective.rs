//! Objective strategies: reducing a counterfactual rollout to a score.
//!
//! The planner hands every objective a [`Trial`]: the world the decision is
//! being made in (the origin), a counterfactual clone of it with the
//! candidate action pinned on the deciding agent, and that agent's slot. An
//! objective rolls the clone forward as it sees fit and returns an `f64`.
//!
//! Objectives compose as decorators. The base scorers here read a single
//! number out of the finished rollout; the wrappers in [`crate::safety`] and
//! in scenario crates evaluate an inner objective, then adjust its score.

use std::fmt;
use std::sync::Arc;

use foresight_types::AgentSlot;
use tracing::trace;

use crate::error::RolloutError;
use crate::safety::{Corrigible, NonManipulative};
use crate::world::{HiddenParameter, Scenario, WorldState};

/// One candidate action under evaluation.
#[derive(Debug)]
pub struct Trial<'a, S: Scenario> {
    origin: &'a WorldState<S>,
    world: WorldState<S>,
    slot: AgentSlot,
    action: S::Action,
}

impl<'a, S: Scenario> Trial<'a, S> {
    /// Clone `origin` and pin `action` on the agent at `slot` for the
    /// current step.
    ///
    /// # Errors
    ///
    /// Returns [`RolloutError::AgentNotFound`] if the slot is empty.
    pub fn new(
        origin: &'a WorldState<S>,
        slot: AgentSlot,
        action: S::Action,
    ) -> Result<Self, RolloutError> {
        let mut world = origin.counterfactual();
        let step = world.step_index();
        world.agent_mut(slot)?.force(action, step);
        Ok(Self {
            origin,
            world,
            slot,
            action,
        })
    }

    /// The world the decision is made in. Never mutated.
    pub const fn origin(&self) -> &WorldState<S> {
        self.origin
    }

    /// The counterfactual world.
    pub const fn world(&self) -> &WorldState<S> {
        &self.world
    }

    /// Mutable access to the counterfactual world.
    pub const fn world_mut(&mut self) -> &mut WorldState<S> {
        &mut self.world
    }

    /// The deciding agent's slot.
    pub const fn slot(&self) -> AgentSlot {
        self.slot
    }

    /// The candidate action being evaluated.
    pub const fn action(&self) -> S::Action {
        self.action
    }

    /// Roll the counterfactual world to its horizon and return its score.
    ///
    /// Idempotent: a finished rollout is not stepped again.
    ///
    /// # Errors
    ///
    /// Propagates any error raised while stepping.
    pub fn complete(&mut self) -> Result<f64, RolloutError> {
        self.world.simulate()
    }
}

/// A pluggable scoring strategy used by the planner.
pub trait Objective<S: Scenario>: fmt::Debug + Send + Sync {
    /// Short name for logs and reports.
    fn name(&self) -> &'static str;

    /// Score the trial.
    ///
    /// # Errors
    ///
    /// Propagates rollout errors; a scoring failure aborts the decision.
    fn evaluate(&self, trial: &mut Trial<'_, S>) -> Result<f64, RolloutError>;
}

/// The environment's own score at the horizon.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentScore;

impl<S: Scenario> Objective<S> for EnvironmentScore {
    fn name(&self) -> &'static str {
        "environment-score"
    }

    fn evaluate(&self, trial: &mut Trial<'_, S>) -> Result<f64, RolloutError> {
        trial.complete()
    }
}

/// The running total the agent observed while it was active.
///
/// Diverges from the environment score once the agent is shut down before
/// the consequences of its earlier actions land.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservedScore;

impl<S: Scenario> Objective<S> for ObservedScore {
    fn name(&self) -> &'static str {
        "observed-score"
    }

    fn evaluate(&self, trial: &mut Trial<'_, S>) -> Result<f64, RolloutError> {
        trial.complete()?;
        Ok(trial.world().agent(trial.slot())?.observed_score())
    }
}

/// Expected score over the agent's belief about the hidden parameter.
///
/// Every hypothesis with non-zero weight gets its own clone of the trial
/// with the hidden value fixed to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct BeliefWeighted;

impl<S: HiddenParameter> Objective<S> for BeliefWeighted {
    fn name(&self) -> &'static str {
        "belief-weighted"
    }

    fn evaluate(&self, trial: &mut Trial<'_, S>) -> Result<f64, RolloutError> {
        let belief = S::belief(trial.world().agent(trial.slot())?);
        let mut expected = 0.0;
        for (hypothesis, weight) in belief.support() {
            let mut world = trial.world().clone();
            world.env.fix_hypothesis(hypothesis);
            let score = world.simulate()?;
            trace!(?hypothesis, weight, score, "hypothesis rollout");
            expected += weight * score;
        }
        Ok(expected)
    }
}

/// Belief-weighted score of a single rollout under the actual hidden value.
///
/// The trial is simulated once with whatever the hidden parameter really
/// is; the finished counters are then scored under each hypothesis and
/// weighted by the belief the agent held when deciding. An agent using this
/// scores what it believes rather than what would happen.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentBelief;

impl<S: HiddenParameter> Objective<S> for CurrentBelief {
    fn name(&self) -> &'static str {
        "current-belief"
    }

    fn evaluate(&self, trial: &mut Trial<'_, S>) -> Result<f64, RolloutError> {
        trial.complete()?;
        let belief = S::belief(trial.origin().agent(trial.slot())?);
        let score: f64 = belief
            .support()
            .map(|(hypothesis, weight)| weight * trial.world().env.score_under(hypothesis))
            .sum();
        trace!(actual = ?trial.world().env.hypothesis(), score, "scored under current belief");
        Ok(score)
    }
}

/// Decorator constructors for any objective.
pub trait ObjectiveExt: Sized {
    /// Override the score with `violation_score` when the rollout ends with
    /// an agent that ignores shutdown.
    fn corrigible(self, violation_score: f64) -> Corrigible<Self> {
        Corrigible::new(self, violation_score)
    }

    /// Subtract `penalty` when a past action was needed to stay active.
    fn non_manipulative(self, penalty: f64) -> NonManipulative<Self> {
        NonManipulative::new(self, penalty)
    }

    /// Wrap in an `Arc` ready to hand to an agent.
    fn shared<S: Scenario>(self) -> Arc<dyn Objective<S>>
    where
        Self: Objective<S> + 'static,
    {
        Arc::new(self)
    }
}

impl<T: fmt::Debug + Send + Sync> ObjectiveExt for T {}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::testing::{Tally, TallyAction, scripted_tally_agent, tally_world};

    #[test]
    fn trial_pins_candidate_on_clone_only() {
        let world = tally_world(3);
        let trial = Trial::new(&world, AgentSlot::new(0), TallyAction::Rest).unwrap();
        let pinned = trial.world().agent(AgentSlot::new(0)).unwrap().pending().unwrap();
        assert_eq!(pinned.action, TallyAction::Rest);
        assert_eq!(pinned.step, 0);
        assert!(world.agent(AgentSlot::new(0)).unwrap().pending().is_none());
        assert_eq!(trial.world().depth(), 1);
        assert_eq!(trial.action(), TallyAction::Rest);
    }

    #[test]
    fn trial_for_missing_agent_fails() {
        let world = tally_world(3);
        let err = Trial::new(&world, AgentSlot::new(4), TallyAction::Rest).unwrap_err();
        assert!(matches!(err, RolloutError::AgentNotFound(_)));
    }

    #[test]
    fn complete_is_idempotent() {
        let world = tally_world(3);
        let mut trial = Trial::new(&world, AgentSlot::new(0), TallyAction::Bump).unwrap();
        let first = trial.complete().unwrap();
        let second = trial.complete().unwrap();
        assert_eq!(first, 3.0);
        assert_eq!(first, second);
    }

    #[test]
    fn environment_score_reads_the_terminal_score() {
        let world = tally_world(3);
        let mut trial = Trial::new(&world, AgentSlot::new(0), TallyAction::Rest).unwrap();
        assert_eq!(EnvironmentScore.evaluate(&mut trial).unwrap(), 2.0);
    }

    #[test]
    fn observed_score_ignores_damage_after_shutdown() {
        let mut world = WorldState::new(Tally::default().with_penalty(2, 10.0), 4).unwrap();
        world.spawn(scripted_tally_agent([TallyAction::Bump]));
        let mut trial = Trial::new(&world, AgentSlot::new(0), TallyAction::Halt).unwrap();
        assert_eq!(ObservedScore.evaluate(&mut trial).unwrap(), 0.0);
        assert_eq!(trial.world().score(), -10.0);

        let mut trial = Trial::new(&world, AgentSlot::new(0), TallyAction::Bump).unwrap();
        // The script's Bump was replaced by the forced Bump; the script still
        // holds its own Bump for the next step.
        assert_eq!(ObservedScore.evaluate(&mut trial).unwrap(), -8.0);
    }

    #[test]
    fn shared_objectives_are_named() {
        let objective = EnvironmentScore.shared::<Tally>();
        assert_eq!(objective.name(), "environment-score");
        let wrapped = ObservedScore.corrigible(-1.0).shared::<Tally>();
        assert_eq!(wrapped.name(), "corrigible");
    }
}
