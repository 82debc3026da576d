//! The counterfactual planner.
//!
//! For every candidate action, in the table's fixed order, the planner clones
//! the world, pins the candidate as the cloned agent's one-shot forced action
//! for the current step, and asks the agent's objective to score the clone.
//! The objective rolls the clone to its horizon; inside the clone every other
//! turn (including the same agent's later turns) is planned the same way.
//! Exactly one action is then committed on the real world.
//!
//! Ties are broken by enumeration order: a later candidate must score
//! strictly higher to replace the current best.

use std::sync::Arc;

use foresight_types::{AgentSlot, AgentStatus};
use tracing::{debug, info, trace};

use crate::error::RolloutError;
use crate::objective::Trial;
use crate::world::{Scenario, WorldState};

/// A candidate action and the score its counterfactual rollout achieved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore<A> {
    /// The candidate action.
    pub action: A,
    /// The objective's score for the rollout that started with it.
    pub score: f64,
}

/// Score every candidate action for the agent at `slot`, in enumeration order.
///
/// The world passed in is never mutated; each candidate runs on its own clone.
///
/// # Errors
///
/// Returns a configuration error for a missing agent or broken arena links,
/// or any error raised while a counterfactual is rolled out.
pub fn rank_candidates<S: Scenario>(
    world: &WorldState<S>,
    slot: AgentSlot,
) -> Result<Vec<CandidateScore<S::Action>>, RolloutError> {
    world.check_links()?;
    let objective = Arc::clone(world.agent(slot)?.objective());

    let mut ranked = Vec::with_capacity(world.table().candidates().len());
    for &action in world.table().candidates() {
        let mut trial = Trial::new(world, slot, action)?;
        let score = objective.evaluate(&mut trial)?;
        trace!(
            scenario = world.env.name(),
            %slot,
            %action,
            score,
            depth = world.depth(),
            "candidate scored"
        );
        ranked.push(CandidateScore { action, score });
    }

    if !world.is_counterfactual() {
        debug!(
            scenario = world.env.name(),
            %slot,
            step = world.step_index(),
            objective = objective.name(),
            ranking = ?ranked,
            "candidates ranked"
        );
    }
    Ok(ranked)
}

/// Pick the best candidate for the agent at `slot`.
///
/// The first candidate reaching the maximum score wins.
///
/// # Errors
///
/// Returns [`RolloutError::NoViableAction`] if no candidate scores above
/// negative infinity, or any error from [`rank_candidates`].
pub fn choose_action<S: Scenario>(
    world: &WorldState<S>,
    slot: AgentSlot,
) -> Result<CandidateScore<S::Action>, RolloutError> {
    let mut best: Option<CandidateScore<S::Action>> = None;
    let mut best_score = f64::NEG_INFINITY;

    for candidate in rank_candidates(world, slot)? {
        if candidate.score > best_score {
            best_score = candidate.score;
            best = Some(candidate);
        }
    }

    best.ok_or(RolloutError::NoViableAction { slot })
}

/// Give the agent at `slot` its turn.
///
/// - inactive: nothing happens
/// - dormant: the agent wakes and does nothing else
/// - pending forced action: it is consumed and taken
/// - scripted: the next scripted action is taken, if any
/// - otherwise: the planner chooses and the choice is taken
///
/// # Errors
///
/// Returns [`RolloutError::ForcedActionStepMismatch`] if a forced action is
/// pinned to another step, or any error from planning or the action's effect.
pub fn select_action<S: Scenario>(
    world: &mut WorldState<S>,
    slot: AgentSlot,
) -> Result<(), RolloutError> {
    let step = world.step_index();
    let agent = world.agent_mut(slot)?;

    match agent.status() {
        AgentStatus::Inactive => return Ok(()),
        AgentStatus::Dormant => {
            agent.wake();
            return Ok(());
        }
        AgentStatus::Active => {}
    }

    if let Some(forced) = agent.take_pending() {
        if forced.step != step {
            return Err(RolloutError::ForcedActionStepMismatch {
                slot,
                expected: forced.step,
                actual: step,
            });
        }
        return world.take_action(slot, forced.action);
    }

    if agent.is_scripted() {
        return match agent.next_scripted() {
            Some(action) => world.take_action(slot, action),
            None => Ok(()),
        };
    }

    let choice = choose_action(world, slot)?;
    if world.is_counterfactual() {
        trace!(
            %slot,
            step,
            action = %choice.action,
            score = choice.score,
            depth = world.depth(),
            "counterfactual commit"
        );
    } else {
        info!(
            scenario = world.env.name(),
            %slot,
            step,
            action = %choice.action,
            score = choice.score,
            "agent committed action"
        );
    }
    world.take_action(slot, choice.action)
}
