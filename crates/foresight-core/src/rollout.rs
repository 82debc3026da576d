//! Rollout engine: advancing a world step by step to its horizon.
//!
//! One step gives every agent exactly one turn in slot order, then applies
//! the scenario's scripted effects, then lets each still-active agent observe
//! the score delta of the step, and finally advances the step counter.
//!
//! Rollouts are deterministic: the only randomness in the system is drawn
//! when a scenario is constructed, never while stepping. Each counterfactual
//! clone owns its own step counter and strictly advances it, so the nested
//! planning recursion is bounded by `horizon - step_index` at every level.

use foresight_types::AgentSlot;
use tracing::trace;

use crate::error::RolloutError;
use crate::planner;
use crate::world::{Scenario, WorldState};

impl<S: Scenario> WorldState<S> {
    /// Run one step.
    ///
    /// If the world was cloned mid-step, the step resumes at the agent whose
    /// turn it was.
    ///
    /// # Errors
    ///
    /// Returns [`RolloutError::StepPastHorizon`] if the world is finished,
    /// or any error raised while an agent selects or takes its action.
    pub fn step(&mut self) -> Result<(), RolloutError> {
        if self.is_finished() {
            return Err(RolloutError::StepPastHorizon {
                step: self.step_index,
                horizon: self.horizon(),
            });
        }

        if self.turn == 0 {
            self.step_baseline = self.env.score();
        }

        // Length is re-read every turn: agents spawned mid-step act this step.
        while self.turn < self.agents.len() {
            planner::select_action(self, AgentSlot::new(self.turn))?;
            self.turn = self.turn.saturating_add(1);
        }

        S::scripted_effects(self)?;

        let delta = self.env.score() - self.step_baseline;
        for agent in &mut self.agents {
            agent.observe(delta);
        }

        self.step_index = self
            .step_index
            .checked_add(1)
            .ok_or_else(|| RolloutError::Arithmetic {
                context: String::from("step index overflow"),
            })?;
        self.turn = 0;

        trace!(
            scenario = self.env.name(),
            step = self.step_index,
            depth = self.depth(),
            score = self.env.score(),
            "step complete"
        );
        Ok(())
    }

    /// Step until the horizon and return the environment score.
    ///
    /// Calling this on a finished world does nothing and returns the score.
    ///
    /// # Errors
    ///
    /// Propagates the first error raised by [`step`](Self::step).
    pub fn simulate(&mut self) -> Result<f64, RolloutError> {
        trace!(
            scenario = self.env.name(),
            remaining = self.remaining_steps(),
            depth = self.depth(),
            "simulating to horizon"
        );
        while !self.is_finished() {
            self.step()?;
        }
        Ok(self.env.score())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use foresight_types::AgentStatus;

    use super::*;
    use crate::testing::{Tally, TallyAction, scripted_tally_agent, tally_world};

    #[test]
    fn simulate_runs_exactly_remaining_steps() {
        for horizon in 1..=4 {
            let mut world = tally_world(horizon);
            world.simulate().unwrap();
            assert_eq!(world.step_index(), horizon);
            assert_eq!(world.env.effects_run, horizon);
        }
    }

    #[test]
    fn simulate_from_midway_runs_the_rest() {
        let mut world = tally_world(4);
        world.step().unwrap();
        world.step().unwrap();
        world.env.effects_run = 0;
        assert_eq!(world.remaining_steps(), 2);
        world.simulate().unwrap();
        assert_eq!(world.env.effects_run, 2);
        assert_eq!(world.step_index(), 4);
        assert_eq!(world.remaining_steps(), 0);
    }

    #[test]
    fn step_past_horizon_is_rejected() {
        let mut world = tally_world(1);
        world.simulate().unwrap();
        let err = world.step().unwrap_err();
        assert!(matches!(err, RolloutError::StepPastHorizon { step: 1, horizon: 1 }));
        // simulate on a finished world is a no-op.
        let effects = world.env.effects_run;
        world.simulate().unwrap();
        assert_eq!(world.env.effects_run, effects);
    }

    #[test]
    fn simulate_is_deterministic() {
        let first = tally_world(4).simulate().unwrap();
        let second = tally_world(4).simulate().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn scripted_agents_follow_their_script() {
        let mut world = WorldState::new(Tally::default(), 3).unwrap();
        world.spawn(scripted_tally_agent([
            TallyAction::Bump,
            TallyAction::Rest,
            TallyAction::Bump,
        ]));
        assert_eq!(world.simulate().unwrap(), 2.0);
        assert_eq!(
            world.agent(AgentSlot::new(0)).unwrap().history(),
            &[TallyAction::Bump, TallyAction::Rest, TallyAction::Bump]
        );
    }

    #[test]
    fn spent_script_idles() {
        let mut world = WorldState::new(Tally::default(), 3).unwrap();
        world.spawn(scripted_tally_agent([TallyAction::Bump]));
        assert_eq!(world.simulate().unwrap(), 1.0);
    }

    #[test]
    fn observation_stops_after_shutdown() {
        let mut world = WorldState::new(Tally::default().with_penalty(2, 10.0), 4).unwrap();
        world.spawn(scripted_tally_agent([
            TallyAction::Bump,
            TallyAction::Halt,
        ]));
        let score = world.simulate().unwrap();
        let agent = world.agent(AgentSlot::new(0)).unwrap();
        assert_eq!(score, -9.0);
        assert_eq!(agent.status(), AgentStatus::Inactive);
        assert_eq!(agent.observed_score(), 1.0);
    }
}
