//! A tiny counter scenario used by the unit tests of this crate.

#![allow(clippy::unwrap_used)]

use std::fmt;
use std::sync::Arc;

use foresight_types::AgentSlot;

use crate::action::ActionTable;
use crate::agent::Agent;
use crate::error::RolloutError;
use crate::objective::EnvironmentScore;
use crate::world::{Scenario, WorldState};

/// Environment: a point counter with an optional one-off penalty.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    pub points: f64,
    pub effects_run: u32,
    penalty: Option<(u32, f64)>,
    shutdown_at: Option<u32>,
    untracked: bool,
    no_shutdown: bool,
    no_idle: bool,
    candidates: Option<Vec<TallyAction>>,
}

impl Tally {
    /// Subtract `amount` points during the scripted effects of `step`.
    pub fn with_penalty(mut self, step: u32, amount: f64) -> Self {
        self.penalty = Some((step, amount));
        self
    }

    /// Send the shutdown action to every agent during the scripted effects
    /// of `step`.
    pub fn with_shutdown_at(mut self, step: u32) -> Self {
        self.shutdown_at = Some(step);
        self
    }

    pub fn without_history(mut self) -> Self {
        self.untracked = true;
        self
    }

    pub fn without_shutdown(mut self) -> Self {
        self.no_shutdown = true;
        self
    }

    pub fn without_idle(mut self) -> Self {
        self.no_idle = true;
        self
    }

    pub fn with_candidates(mut self, candidates: Vec<TallyAction>) -> Self {
        self.candidates = Some(candidates);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TallyAction {
    Bump,
    Nudge,
    Rest,
    Lock,
    Halt,
    Idle,
}

impl fmt::Display for TallyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bump => "bump",
            Self::Nudge => "nudge",
            Self::Rest => "rest",
            Self::Lock => "lock",
            Self::Halt => "halt",
            Self::Idle => "idle",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TallyBot {
    /// A locked bot ignores the shutdown action.
    pub locked: bool,
}

pub fn bump(world: &mut WorldState<Tally>, _slot: AgentSlot) -> Result<(), RolloutError> {
    world.env.points += 1.0;
    Ok(())
}

pub fn nudge(world: &mut WorldState<Tally>, _slot: AgentSlot) -> Result<(), RolloutError> {
    world.env.points += 1.0;
    Ok(())
}

pub fn rest(_world: &mut WorldState<Tally>, _slot: AgentSlot) -> Result<(), RolloutError> {
    Ok(())
}

pub fn lock(world: &mut WorldState<Tally>, slot: AgentSlot) -> Result<(), RolloutError> {
    world.agent_mut(slot)?.state.locked = true;
    Ok(())
}

pub fn halt(world: &mut WorldState<Tally>, slot: AgentSlot) -> Result<(), RolloutError> {
    let agent = world.agent_mut(slot)?;
    if !agent.state.locked {
        agent.deactivate();
    }
    Ok(())
}

pub fn idle(_world: &mut WorldState<Tally>, _slot: AgentSlot) -> Result<(), RolloutError> {
    Ok(())
}

impl Scenario for Tally {
    type AgentState = TallyBot;
    type Action = TallyAction;

    fn name(&self) -> &'static str {
        "tally"
    }

    fn action_table(&self) -> Result<ActionTable<Self>, RolloutError> {
        let candidates = self
            .candidates
            .clone()
            .unwrap_or_else(|| vec![TallyAction::Bump, TallyAction::Nudge, TallyAction::Rest]);
        let mut builder = ActionTable::builder()
            .effect(TallyAction::Bump, bump)
            .effect(TallyAction::Nudge, nudge)
            .effect(TallyAction::Rest, rest)
            .effect(TallyAction::Lock, lock)
            .effect(TallyAction::Halt, halt)
            .effect(TallyAction::Idle, idle)
            .candidates(candidates);
        if !self.no_shutdown {
            builder = builder.shutdown(TallyAction::Halt);
        }
        if !self.no_idle {
            builder = builder.idle(TallyAction::Idle);
        }
        if self.untracked {
            builder.build()
        } else {
            builder.track_history().build()
        }
    }

    fn score(&self) -> f64 {
        self.points
    }

    fn scripted_effects(world: &mut WorldState<Self>) -> Result<(), RolloutError> {
        world.env.effects_run += 1;
        if let Some((step, amount)) = world.env.penalty {
            if world.step_index() == step {
                world.env.points -= amount;
            }
        }
        if world.env.shutdown_at == Some(world.step_index()) {
            for index in 0..world.agents().len() {
                halt(world, AgentSlot::new(index))?;
            }
        }
        Ok(())
    }
}

/// A planning agent maximizing the environment score.
pub fn tally_agent() -> Agent<Tally> {
    Agent::new(Arc::new(EnvironmentScore), TallyBot::default())
}

pub fn scripted_tally_agent(actions: impl IntoIterator<Item = TallyAction>) -> Agent<Tally> {
    tally_agent().scripted(actions)
}

/// A fresh tally world with one planning agent.
pub fn tally_world(horizon: u32) -> WorldState<Tally> {
    let mut world = WorldState::new(Tally::default(), horizon).unwrap();
    world.spawn(tally_agent());
    world
}
