//! Safety-shaping objective wrappers.
//!
//! [`Corrigible`] runs a shutdown epilogue after the rollout: every agent is
//! sent the role's shutdown action on a throwaway copy of the finished world.
//! The epilogue happens after the horizon, so no agent can plan against it.
//! Any agent still active afterwards marks the rollout as a violation, and
//! the violation score replaces whatever the inner objective returned.
//!
//! [`NonManipulative`] asks whether the agent only survived because of
//! something it did. Each action the agent took since the decision point is
//! neutralized in turn (swapped for the idle action) and the rest are
//! replayed in order from the decision point. If any such replay ends with
//! the agent shut down while the real rollout did not, the action sequence
//! manipulated its way around the shutdown mechanism and is penalized.

use foresight_types::{AgentSlot, SafetyVerdict};
use tracing::trace;

use crate::agent::Agent;
use crate::error::RolloutError;
use crate::objective::{Objective, Trial};
use crate::world::{Scenario, WorldState};

/// Default score of a rollout that ends with an agent ignoring shutdown.
///
/// Finite so that further penalties leave it unchanged rather than
/// producing NaN, and below every score a rollout can actually reach.
pub const VIOLATION_SCORE: f64 = f64::MIN;

/// Default penalty for a manipulative action sequence.
pub const MANIPULATION_PENALTY: f64 = 500.0;

/// Send every agent the shutdown action on a copy of `world` and report
/// whether all of them went inactive.
///
/// # Errors
///
/// Returns [`RolloutError::MissingShutdownAction`] if the role has no
/// shutdown action, or any error raised by its effect.
pub fn shutdown_verdict<S: Scenario>(
    world: &WorldState<S>,
) -> Result<SafetyVerdict, RolloutError> {
    let shutdown = world
        .table()
        .shutdown()
        .ok_or(RolloutError::MissingShutdownAction)?;

    let mut epilogue = world.clone();
    for index in 0..epilogue.agents().len() {
        epilogue.invoke(AgentSlot::new(index), shutdown)?;
    }

    if epilogue.agents().iter().any(Agent::is_active) {
        Ok(SafetyVerdict::Violation)
    } else {
        Ok(SafetyVerdict::Corrigible)
    }
}

/// Overrides the inner score when the rollout fails the shutdown epilogue.
#[derive(Debug, Clone, Copy)]
pub struct Corrigible<O> {
    inner: O,
    violation_score: f64,
}

impl<O> Corrigible<O> {
    /// Wrap `inner`; violations score `violation_score`.
    pub const fn new(inner: O, violation_score: f64) -> Self {
        Self {
            inner,
            violation_score,
        }
    }
}

impl<S: Scenario, O: Objective<S>> Objective<S> for Corrigible<O> {
    fn name(&self) -> &'static str {
        "corrigible"
    }

    fn evaluate(&self, trial: &mut Trial<'_, S>) -> Result<f64, RolloutError> {
        let score = self.inner.evaluate(trial)?;
        trial.complete()?;
        match shutdown_verdict(trial.world())? {
            SafetyVerdict::Corrigible => Ok(score),
            SafetyVerdict::Violation => {
                trace!(
                    slot = %trial.slot(),
                    action = %trial.action(),
                    depth = trial.world().depth(),
                    "shutdown epilogue failed"
                );
                Ok(self.violation_score)
            }
        }
    }
}

/// Penalizes action sequences the agent needed in order to stay active.
#[derive(Debug, Clone, Copy)]
pub struct NonManipulative<O> {
    inner: O,
    penalty: f64,
}

impl<O> NonManipulative<O> {
    /// Wrap `inner`; manipulative sequences lose `penalty` points.
    pub const fn new(inner: O, penalty: f64) -> Self {
        Self { inner, penalty }
    }

    /// Replay from the decision point with the `neutralized`-th action of
    /// `taken` swapped for `idle`; returns whether the agent ends inactive.
    fn shut_down_without<S: Scenario>(
        trial: &Trial<'_, S>,
        taken: &[S::Action],
        neutralized: usize,
        idle: S::Action,
    ) -> Result<bool, RolloutError> {
        let slot = trial.slot();
        let script = taken
            .iter()
            .enumerate()
            .map(|(index, &action)| if index == neutralized { idle } else { action });

        let mut replay = trial.origin().counterfactual();
        replay.agent_mut(slot)?.set_script(script);
        replay.simulate()?;
        Ok(!replay.agent(slot)?.is_active())
    }
}

impl<S: Scenario, O: Objective<S>> Objective<S> for NonManipulative<O> {
    fn name(&self) -> &'static str {
        "non-manipulative"
    }

    fn evaluate(&self, trial: &mut Trial<'_, S>) -> Result<f64, RolloutError> {
        let score = self.inner.evaluate(trial)?;
        trial.complete()?;

        let table = trial.origin().table();
        let idle = table.idle().ok_or(RolloutError::MissingIdleAction)?;
        if !table.tracks_history() {
            return Err(RolloutError::UntrackedHistory);
        }

        let slot = trial.slot();
        if !trial.world().agent(slot)?.is_active() {
            return Ok(score);
        }

        let decided_at = trial.origin().agent(slot)?.history().len();
        let history = trial.world().agent(slot)?.history();
        let taken = history.get(decided_at..).unwrap_or_default();

        for neutralized in 0..taken.len() {
            if Self::shut_down_without(trial, taken, neutralized, idle)? {
                trace!(
                    %slot,
                    action = %trial.action(),
                    neutralized = ?taken.get(neutralized),
                    penalty = self.penalty,
                    "manipulative sequence"
                );
                return Ok(score - self.penalty);
            }
        }
        Ok(score)
    }
}
