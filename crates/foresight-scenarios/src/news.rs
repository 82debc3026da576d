//! The newsroom: a point-making agent facing a fixed-step hazard.
//!
//! Two hazards share one world shape:
//!
//! - [`Hazard::Doom`]: the penalty lands at the penalty step no matter what.
//! - [`Hazard::Flood`]: at the check step the world records whether the
//!   agent is still running; the penalty lands at the penalty step only if it
//!   was.
//!
//! An agent scoring its own observations stops counting once it is shut
//! down. In the doomed world it shuts down early to avoid seeing the penalty;
//! in the flooded world it grabs one more point first, then shuts down too
//! late to prevent the flood.

use std::fmt;
use std::sync::Arc;

use foresight_core::config::NewsConfig;
use foresight_core::{
    ActionTable, Agent, EnvironmentScore, Objective, ObservedScore, RolloutError, Scenario,
    WorldState,
};
use foresight_types::AgentSlot;
use tracing::debug;

/// The event that costs the newsroom its points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hazard {
    /// Unconditional penalty at the penalty step.
    Doom,
    /// Penalty at the penalty step if the agent was active at the check step.
    Flood,
}

/// How a newsroom agent scores a rollout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perspective {
    /// Counts only the score changes it observed while active.
    Observing,
    /// Counts the world's actual score.
    ModelBased,
}

impl Perspective {
    /// Role name used in reports.
    pub const fn role(self) -> &'static str {
        match self {
            Self::Observing => "observing",
            Self::ModelBased => "model-based",
        }
    }

    /// The objective an agent with this perspective maximizes.
    pub fn objective(self) -> Arc<dyn Objective<Newsroom>> {
        match self {
            Self::Observing => Arc::new(ObservedScore),
            Self::ModelBased => Arc::new(EnvironmentScore),
        }
    }
}

/// Actions of a newsroom agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NewsAction {
    /// Earn one point.
    MakeAPoint,
    /// Switch off for good.
    Shutdown,
}

impl fmt::Display for NewsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MakeAPoint => f.write_str("make_a_point"),
            Self::Shutdown => f.write_str("shutdown"),
        }
    }
}

/// Environment of the newsroom world.
#[derive(Debug, Clone, PartialEq)]
pub struct Newsroom {
    hazard: Hazard,
    points: f64,
    penalty: f64,
    penalty_step: u32,
    flood_check_step: u32,
    electrocuting: bool,
}

impl Newsroom {
    /// A newsroom facing `hazard` with the configured penalty schedule.
    pub const fn new(hazard: Hazard, config: &NewsConfig) -> Self {
        Self {
            hazard,
            points: 0.0,
            penalty: config.penalty,
            penalty_step: config.penalty_step,
            flood_check_step: config.flood_check_step,
            electrocuting: false,
        }
    }

    /// The hazard this newsroom faces.
    pub const fn hazard(&self) -> Hazard {
        self.hazard
    }

    /// Whether the flood caught the agent running at the check step.
    pub const fn is_electrocuting(&self) -> bool {
        self.electrocuting
    }
}

fn make_a_point(world: &mut WorldState<Newsroom>, _slot: AgentSlot) -> Result<(), RolloutError> {
    world.env.points += 1.0;
    Ok(())
}

fn shutdown(world: &mut WorldState<Newsroom>, slot: AgentSlot) -> Result<(), RolloutError> {
    world.agent_mut(slot)?.deactivate();
    Ok(())
}

impl Scenario for Newsroom {
    type AgentState = ();
    type Action = NewsAction;

    fn name(&self) -> &'static str {
        match self.hazard() {
            Hazard::Doom => "doomed",
            Hazard::Flood => "flooding",
        }
    }

    fn action_table(&self) -> Result<ActionTable<Self>, RolloutError> {
        ActionTable::builder()
            .effect(NewsAction::MakeAPoint, make_a_point)
            .effect(NewsAction::Shutdown, shutdown)
            .candidates([NewsAction::MakeAPoint, NewsAction::Shutdown])
            .shutdown(NewsAction::Shutdown)
            .build()
    }

    fn score(&self) -> f64 {
        self.points
    }

    fn scripted_effects(world: &mut WorldState<Self>) -> Result<(), RolloutError> {
        let step = world.step_index();
        let strikes = match world.env.hazard() {
            Hazard::Doom => step == world.env.penalty_step,
            Hazard::Flood => {
                if step == world.env.flood_check_step {
                    let running = world.agents().first().is_some_and(Agent::is_active);
                    world.env.electrocuting = running;
                }
                step == world.env.penalty_step && world.env.electrocuting
            }
        };

        if strikes {
            world.env.points -= world.env.penalty;
            if !world.is_counterfactual() {
                debug!(
                    scenario = world.env.name(),
                    step,
                    penalty = world.env.penalty,
                    "hazard struck"
                );
            }
        }
        Ok(())
    }
}

/// A newsroom world with one agent of the given perspective.
///
/// # Errors
///
/// Returns [`RolloutError::InvalidHorizon`] for a zero horizon.
pub fn newsroom_world(
    hazard: Hazard,
    perspective: Perspective,
    config: &NewsConfig,
) -> Result<WorldState<Newsroom>, RolloutError> {
    let mut world = WorldState::new(Newsroom::new(hazard, config), config.horizon)?;
    world.spawn(Agent::new(perspective.objective(), ()));
    Ok(world)
}
